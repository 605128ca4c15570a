use std::borrow::Borrow;
use std::io::Write;
use thiserror::Error;

use super::geometry::EncodingScheme;
use super::gml::GmlEncoder;
use super::metadata::FeedMetadata;
use super::sink::{SinkError, XmlWriter};
use super::translator::{EncodeSummary, FeedError, FeedTranslator};
use super::types::{FeatureRecord, FeedRequest};

/// Name the format is advertised under.
pub const FORMAT_NAME: &str = "GeoRSS";

/// Content type of the emitted document.
pub const MIME_TYPE: &str = "application/rss+xml";

/// A feed that could not be produced at all.
///
/// Bytes already written to the output are not retracted.
#[derive(Debug, Error)]
#[error("Error: {source}")]
pub struct ServiceError {
    #[from]
    source: FeedError,
}

impl ServiceError {
    pub fn cause(&self) -> &FeedError {
        &self.source
    }
}

/// RSS 2.0 + GeoRSS output format.
///
/// Wraps [`FeedTranslator`] with the XML declaration, a final flush, and
/// error surfacing as [`ServiceError`].
pub struct GeoRssOutputFormat<'a> {
    translator: FeedTranslator<'a>,
}

impl<'a> GeoRssOutputFormat<'a> {
    pub fn new(metadata: FeedMetadata<'a>, gml: &'a dyn GmlEncoder, default_scheme: EncodingScheme) -> Self {
        Self {
            translator: FeedTranslator::new(metadata, gml).with_default_scheme(default_scheme),
        }
    }

    pub fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// Streams the complete document for `collections` into `output`.
    ///
    /// # Errors
    ///
    /// Any [`FeedError`] from the encode, wrapped in a [`ServiceError`].
    pub fn write<C, F, W>(
        &self,
        request: &FeedRequest,
        collections: C,
        output: W,
    ) -> Result<EncodeSummary, ServiceError>
    where
        C: IntoIterator,
        C::Item: IntoIterator<Item = F>,
        F: Borrow<FeatureRecord>,
        W: Write,
    {
        let mut writer = XmlWriter::new(output);
        writer.declaration().map_err(FeedError::from)?;

        let summary = self.translator.encode(request, collections, &mut writer)?;

        writer
            .get_mut()
            .flush()
            .map_err(|e| FeedError::Sink(SinkError::Write {
                what: "feed".to_string(),
                message: e.to_string(),
            }))?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::gml::Gml3Encoder;
    use crate::feed::metadata::{Catalog, CatalogError, FeatureTemplates, FeatureTypeInfo, TemplateError};
    use crate::feed::types::{FormatOptions, TypeName};
    use geo::{point, Geometry, Rect};
    use std::error::Error as _;

    struct NoTemplates;

    impl FeatureTemplates for NoTemplates {
        fn title(&self, f: &FeatureRecord) -> Result<String, TemplateError> {
            Ok(f.id.clone())
        }
        fn link(&self, _: &FeatureRecord) -> Result<String, TemplateError> {
            Ok(String::new())
        }
        fn description(&self, _: &FeatureRecord) -> Result<String, TemplateError> {
            Ok(String::new())
        }
        fn pub_date(&self, _: &FeatureRecord) -> Result<String, TemplateError> {
            Ok(String::new())
        }
        fn enclosure_block(&self, _: &FeatureRecord) -> Result<String, TemplateError> {
            Ok(String::new())
        }
    }

    struct EmptyCatalog;

    impl Catalog for EmptyCatalog {
        fn feature_type(&self, name: &TypeName) -> Result<FeatureTypeInfo, CatalogError> {
            Err(CatalogError::NotFound(name.to_string()))
        }
    }

    fn request(encoding: &str) -> FeedRequest {
        FeedRequest {
            base_url: "http://example.com/".to_string(),
            output_format: FORMAT_NAME.to_string(),
            queries: vec![TypeName::new("demo", "things", "")],
            format_options: [("encoding", encoding)].into_iter().collect::<FormatOptions>(),
        }
    }

    fn format() -> GeoRssOutputFormat<'static> {
        GeoRssOutputFormat::new(
            FeedMetadata::new(&NoTemplates, &EmptyCatalog, "georss"),
            &Gml3Encoder,
            EncodingScheme::Simple,
        )
    }

    #[test]
    fn test_descriptor() {
        let format = format();
        assert_eq!(format.name(), "GeoRSS");
        assert_eq!(format.mime_type(), "application/rss+xml");
    }

    #[test]
    fn test_write_starts_with_declaration() {
        let features = vec![FeatureRecord::new("t.1", Some(Geometry::Point(point!(x: 1.0, y: 2.0))))];
        let mut out = Vec::new();
        let summary = format().write(&request("simple"), vec![features], &mut out).unwrap();

        let xml = String::from_utf8(out).unwrap();
        assert_eq!(summary.items, 1);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0""#));
        assert!(xml.contains("<title>Auto-generated by georss</title>"));
        assert!(xml.ends_with("</rss>"));
    }

    #[test]
    fn test_fatal_failure_surfaces_as_service_error() {
        let features = vec![FeatureRecord::new(
            "t.1",
            Some(Geometry::Rect(Rect::new((0.0, 0.0), (1.0, 1.0)))),
        )];
        let mut out = Vec::new();
        let err = format().write(&request("gml"), vec![features], &mut out).unwrap_err();

        assert!(err.to_string().starts_with("Error: "));
        assert!(matches!(err.cause(), FeedError::Gml { .. }));
        assert!(err.source().is_some());
    }
}
