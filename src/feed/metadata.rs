//! Feed- and item-level text resolution.
//!
//! [`FeedMetadata`] bridges requests and features to human-facing text by
//! calling the [`FeatureTemplates`] and [`Catalog`] collaborators. Every
//! lookup is isolated: a failing collaborator call is logged and replaced
//! by a fallback value, and never prevents the other lookups from running.

use serde::Deserialize;
use thiserror::Error;

use super::enclosure::parse_enclosures;
use super::types::{EnclosureRecord, FeatureRecord, FeedRequest, TypeName};
use crate::util::build_service_url;

/// Text used for the feed link when no URL can be built.
pub const FEED_URL_FALLBACK: &str = "Unable to create feed url";

/// Errors raised by a template collaborator.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Render(String),

    #[error("Attribute '{0}' is not present on the feature")]
    MissingAttribute(String),
}

/// Errors raised by a catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Feature type '{0}' is not in the catalog")]
    NotFound(String),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Reasons the feed link cannot be built.
#[derive(Debug, Error)]
pub enum FeedLinkError {
    #[error("Request has no queries")]
    NoQuery,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Catalog metadata for one feature type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureTypeInfo {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

/// Renders per-feature text.
///
/// Implementations may be slow or fail; callers apply fallbacks.
pub trait FeatureTemplates {
    fn title(&self, feature: &FeatureRecord) -> Result<String, TemplateError>;
    fn link(&self, feature: &FeatureRecord) -> Result<String, TemplateError>;
    fn description(&self, feature: &FeatureRecord) -> Result<String, TemplateError>;
    fn pub_date(&self, feature: &FeatureRecord) -> Result<String, TemplateError>;
    /// Line-oriented `url=`/`length=`/`type=` block, see [`parse_enclosures`].
    fn enclosure_block(&self, feature: &FeatureRecord) -> Result<String, TemplateError>;
}

/// Looks up feature type metadata.
pub trait Catalog {
    fn feature_type(&self, name: &TypeName) -> Result<FeatureTypeInfo, CatalogError>;
}

/// Resolved text for one item; every field already carries its fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMetadata {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub pub_date: Option<String>,
    pub enclosures: Vec<EnclosureRecord>,
}

/// Adapter applying fallback values around the collaborators.
pub struct FeedMetadata<'a> {
    templates: &'a dyn FeatureTemplates,
    catalog: &'a dyn Catalog,
    system_name: &'a str,
}

impl<'a> FeedMetadata<'a> {
    pub fn new(templates: &'a dyn FeatureTemplates, catalog: &'a dyn Catalog, system_name: &'a str) -> Self {
        Self {
            templates,
            catalog,
            system_name,
        }
    }

    fn auto_generated(&self) -> String {
        format!("Auto-generated by {}", self.system_name)
    }

    /// Newline-joined catalog titles of every requested type.
    ///
    /// Any failed lookup discards what was gathered and yields
    /// `"Auto-generated by <system>"`.
    pub fn feed_title(&self, request: &FeedRequest) -> String {
        self.joined_catalog_text(request, "title", |info| info.title)
    }

    /// Newline-joined catalog abstracts, with the same fallback as
    /// [`FeedMetadata::feed_title`].
    pub fn feed_description(&self, request: &FeedRequest) -> String {
        self.joined_catalog_text(request, "description", |info| info.abstract_text)
    }

    fn joined_catalog_text(
        &self,
        request: &FeedRequest,
        what: &str,
        field: impl Fn(FeatureTypeInfo) -> Option<String>,
    ) -> String {
        let mut parts = Vec::with_capacity(request.queries.len());
        for name in &request.queries {
            match self.catalog.feature_type(name) {
                Ok(info) => {
                    if let Some(text) = field(info).filter(|t| !t.trim().is_empty()) {
                        parts.push(text.trim().to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        type_name = %name,
                        error = %e,
                        "Unable to determine a valid {what} for feed"
                    );
                    return self.auto_generated();
                }
            }
        }
        parts.join("\n")
    }

    /// GetFeature URL for the first requested type.
    pub fn feed_link_url(&self, request: &FeedRequest) -> Result<String, FeedLinkError> {
        let type_name = request.queries.first().ok_or(FeedLinkError::NoQuery)?.to_string();
        let url = build_service_url(
            &request.base_url,
            "wfs",
            &[
                ("request", "GetFeature"),
                ("typeName", type_name.as_str()),
                ("outputFormat", request.output_format.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    /// Like [`FeedMetadata::feed_link_url`] but never fails: problems are
    /// logged and [`FEED_URL_FALLBACK`] is returned instead.
    pub fn feed_link(&self, request: &FeedRequest) -> String {
        match self.feed_link_url(request) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(base_url = %request.base_url, error = %e, "Unable to create feed url");
                FEED_URL_FALLBACK.to_string()
            }
        }
    }

    /// Resolves all item text for a feature. Each lookup falls back
    /// independently.
    pub fn item(&self, feature: &FeatureRecord) -> ItemMetadata {
        ItemMetadata {
            title: self.item_title(feature),
            link: self.item_link(feature),
            description: self.item_description(feature),
            pub_date: self.item_pub_date(feature),
            enclosures: self.item_enclosures(feature),
        }
    }

    /// Falls back to the feature id.
    pub fn item_title(&self, feature: &FeatureRecord) -> String {
        self.templates.title(feature).unwrap_or_else(|e| {
            warn_template(feature, "title", &e);
            feature.id.clone()
        })
    }

    /// `None` when the template fails or renders nothing.
    pub fn item_link(&self, feature: &FeatureRecord) -> Option<String> {
        match self.templates.link(feature) {
            Ok(link) => non_empty(link),
            Err(e) => {
                warn_template(feature, "link", &e);
                None
            }
        }
    }

    /// Falls back to the feature id.
    pub fn item_description(&self, feature: &FeatureRecord) -> String {
        self.templates.description(feature).unwrap_or_else(|e| {
            warn_template(feature, "description", &e);
            feature.id.clone()
        })
    }

    /// Trimmed template output, `None` when empty or on failure.
    pub fn item_pub_date(&self, feature: &FeatureRecord) -> Option<String> {
        match self.templates.pub_date(feature) {
            Ok(date) => non_empty(date),
            Err(e) => {
                warn_template(feature, "pubDate", &e);
                None
            }
        }
    }

    /// Parsed enclosure records, empty on failure.
    pub fn item_enclosures(&self, feature: &FeatureRecord) -> Vec<EnclosureRecord> {
        match self.templates.enclosure_block(feature) {
            Ok(block) => parse_enclosures(&block),
            Err(e) => {
                warn_template(feature, "enclosure", &e);
                Vec::new()
            }
        }
    }
}

fn warn_template(feature: &FeatureRecord, template: &str, error: &TemplateError) {
    tracing::warn!(
        feature_id = %feature.id,
        template = template,
        error = %error,
        "Error executing template, using fallback"
    );
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}
