//! Feed translator: drives one encode from `<rss>` to `</rss>`.
//!
//! The pass is linear: open the channel, emit one item (plus optional
//! continuation items) per feature in collection order, close the channel.
//! Each feature is first resolved into a [`FeedEntry`] without touching the
//! output, so a feature that cannot be encoded is skipped cleanly. Only
//! write failures and GML encoder failures, which happen after an item has
//! started, abort the feed.

use std::borrow::Borrow;
use thiserror::Error;

use super::geometry::{members, EncodingScheme, GeometryError, MarkupWriteError, GEORSS_NAMESPACE};
use super::gml::{GmlEncoder, GmlError};
use super::metadata::{FeedMetadata, ItemMetadata};
use super::sink::{SinkError, XmlSink};
use super::types::{FeatureRecord, FeedEntry, FeedRequest, GeometryValue};

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Why a single feature was left out of the feed.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The scheme needs a geometry and the feature has none.
    #[error("feature has no geometry")]
    MissingGeometry,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Failures that terminate the whole encode.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A GML fragment failed after the item was partially written.
    #[error("Cannot transform the geometry of feature '{feature_id}' in GML: {source}")]
    Gml {
        feature_id: String,
        #[source]
        source: GmlError,
    },
}

impl FeedError {
    fn from_markup(feature_id: &str, err: MarkupWriteError) -> Self {
        match err {
            MarkupWriteError::Sink(e) => FeedError::Sink(e),
            MarkupWriteError::Gml(source) => FeedError::Gml {
                feature_id: feature_id.to_string(),
                source,
            },
        }
    }
}

/// Per-feed settings, fixed when the channel opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub scheme: EncodingScheme,
    /// Emit continuation items for members 1..N of multi-part geometries.
    pub continuation: bool,
}

impl EncodeOptions {
    /// Reads the `encoding` and `continuation` format options.
    ///
    /// A missing `encoding` keeps `default_scheme`. `continuation` is true
    /// only for a case-insensitive `"true"`.
    pub fn from_request(request: &FeedRequest, default_scheme: EncodingScheme) -> Self {
        let options = &request.format_options;

        let scheme = match options.get("encoding") {
            Some(value) => {
                tracing::info!(
                    encoding = value,
                    "Overriding geometry encoding with value specified in format options"
                );
                EncodingScheme::from_option(value)
            }
            None => default_scheme,
        };

        let continuation = match options.get("continuation") {
            Some(value) => {
                tracing::info!(
                    continuation = value,
                    "Overriding continuation with value specified in format options"
                );
                value.eq_ignore_ascii_case("true")
            }
            None => false,
        };

        Self {
            scheme,
            continuation,
        }
    }
}

/// Counts reported after a completed encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Primary items written, one per encoded feature.
    pub items: usize,
    /// Continuation items written.
    pub continuations: usize,
    /// Features left out after a per-feature failure.
    pub skipped: usize,
}

/// Encodes feature collections as an RSS 2.0 channel.
///
/// Holds no per-encode state, so one translator can serve any number of
/// encodes, including concurrent ones on separate sinks.
pub struct FeedTranslator<'a> {
    metadata: FeedMetadata<'a>,
    gml: &'a dyn GmlEncoder,
    default_scheme: EncodingScheme,
}

impl<'a> FeedTranslator<'a> {
    pub fn new(metadata: FeedMetadata<'a>, gml: &'a dyn GmlEncoder) -> Self {
        Self {
            metadata,
            gml,
            default_scheme: EncodingScheme::default(),
        }
    }

    /// Scheme used when the request carries no `encoding` option.
    pub fn with_default_scheme(mut self, scheme: EncodingScheme) -> Self {
        self.default_scheme = scheme;
        self
    }

    /// Writes the complete `<rss>` document body for `collections`.
    ///
    /// Collections are consumed one at a time and each iterator is dropped
    /// before the next one is created, including when the encode fails.
    ///
    /// # Errors
    ///
    /// [`FeedError::Sink`] if the sink rejects a write, [`FeedError::Gml`]
    /// if the GML encoder fails. Per-feature failures are logged and
    /// counted in [`EncodeSummary::skipped`] instead.
    pub fn encode<C, F>(
        &self,
        request: &FeedRequest,
        collections: C,
        sink: &mut dyn XmlSink,
    ) -> Result<EncodeSummary, FeedError>
    where
        C: IntoIterator,
        C::Item: IntoIterator<Item = F>,
        F: Borrow<FeatureRecord>,
    {
        let options = EncodeOptions::from_request(request, self.default_scheme);
        self.open_channel(request, options.scheme, sink)?;

        let mut summary = EncodeSummary::default();
        for collection in collections {
            for feature in collection {
                let feature = feature.borrow();
                match self.build_entry(feature, &options) {
                    Ok(entry) => {
                        self.write_entry(&feature.id, &entry, sink)?;
                        summary.items += 1;
                        summary.continuations += entry.continuations.len();
                    }
                    Err(reason) => {
                        tracing::warn!(
                            feature_id = %feature.id,
                            error = %reason,
                            "Encoding failed for feature, skipping"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        self.close_channel(sink)?;
        tracing::debug!(
            items = summary.items,
            continuations = summary.continuations,
            skipped = summary.skipped,
            "Feed encoded"
        );
        Ok(summary)
    }

    fn open_channel(
        &self,
        request: &FeedRequest,
        scheme: EncodingScheme,
        sink: &mut dyn XmlSink,
    ) -> Result<(), SinkError> {
        let scheme_xmlns = format!("xmlns:{}", scheme.prefix());
        let mut attributes = vec![
            ("version", "2.0"),
            ("xmlns:georss", GEORSS_NAMESPACE),
            ("xmlns:atom", ATOM_NAMESPACE),
        ];
        if scheme.namespace_uri() != GEORSS_NAMESPACE {
            attributes.push((scheme_xmlns.as_str(), scheme.namespace_uri()));
        }

        sink.start("rss", &attributes)?;
        sink.start("channel", &[])?;

        sink.element("title", &self.metadata.feed_title(request))?;
        sink.element("description", &self.metadata.feed_description(request))?;

        let feed_link = self.metadata.feed_link(request);
        sink.cdata_element("link", &feed_link)?;
        sink.empty("atom:link", &[("href", feed_link.as_str()), ("rel", "self")])
    }

    fn close_channel(&self, sink: &mut dyn XmlSink) -> Result<(), SinkError> {
        sink.end("channel")?;
        sink.end("rss")
    }

    /// Resolves one feature into its entry and continuation entries.
    ///
    /// Nothing is written here; an error means the feature is skipped.
    pub fn build_entry(
        &self,
        feature: &FeatureRecord,
        options: &EncodeOptions,
    ) -> Result<FeedEntry, SkipReason> {
        let item = self.metadata.item(feature);
        let scheme = options.scheme;
        let geometry = feature.geometry.as_ref();
        let parts = geometry.and_then(members);

        let (primary, continuations) = match (scheme, geometry, parts) {
            (EncodingScheme::LatLong, None, _) => return Err(SkipReason::MissingGeometry),
            (EncodingScheme::LatLong, Some(whole), _) | (_, Some(whole), None) => {
                (scheme.markup(whole)?, Vec::new())
            }
            (_, None, _) => (None, Vec::new()),
            (_, Some(_), Some(parts)) => {
                let mut parts = parts.into_iter();
                let primary = match parts.next() {
                    Some(first) => scheme.markup(&first)?,
                    None => None,
                };
                let continuations = if options.continuation {
                    parts
                        .enumerate()
                        .map(|(i, member)| continuation_entry(feature, &item, i + 1, &member, scheme))
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    Vec::new()
                };
                (primary, continuations)
            }
        };

        Ok(FeedEntry {
            guid: item.link.clone(),
            title: item.title,
            link: item.link,
            description: item.description,
            pub_date: item.pub_date,
            enclosures: item.enclosures,
            geometry: primary,
            continuations,
        })
    }

    fn write_entry(
        &self,
        feature_id: &str,
        entry: &FeedEntry,
        sink: &mut dyn XmlSink,
    ) -> Result<(), FeedError> {
        sink.start("item", &[])?;
        sink.element("title", &entry.title)?;
        if let Some(pub_date) = &entry.pub_date {
            sink.element("pubDate", pub_date)?;
        }
        if let Some(link) = &entry.link {
            sink.cdata_element("link", link)?;
        }
        if let Some(guid) = &entry.guid {
            sink.cdata_element("guid", guid)?;
        }
        sink.cdata_element("description", &entry.description)?;

        for enclosure in &entry.enclosures {
            sink.empty(
                "enclosure",
                &[
                    ("url", enclosure.url.as_str()),
                    ("length", enclosure.length.as_str()),
                    ("type", enclosure.mime_type.as_str()),
                ],
            )?;
        }

        if let Some(geometry) = &entry.geometry {
            geometry
                .write(sink, self.gml)
                .map_err(|e| FeedError::from_markup(feature_id, e))?;
        }
        sink.end("item")?;

        for continuation in &entry.continuations {
            self.write_entry(feature_id, continuation, sink)?;
        }
        Ok(())
    }
}

/// Entry for member `index` of a multi-part geometry.
///
/// Reuses the primary title and link; the guid is the link (or the feature
/// id when there is none) with `#index` appended.
fn continuation_entry(
    feature: &FeatureRecord,
    item: &ItemMetadata,
    index: usize,
    member: &GeometryValue,
    scheme: EncodingScheme,
) -> Result<FeedEntry, SkipReason> {
    let title = format!("Continuation of {}", item.title);
    let guid_base = item.link.as_deref().unwrap_or(&feature.id);

    Ok(FeedEntry {
        description: title.clone(),
        title,
        link: item.link.clone(),
        guid: Some(format!("{guid_base}#{index}")),
        pub_date: None,
        enclosures: Vec::new(),
        geometry: scheme.markup(member)?,
        continuations: Vec::new(),
    })
}
