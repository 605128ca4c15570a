//! Feed encoding: feature collections in, GeoRSS-tagged RSS 2.0 out.
//!
//! - **Translation**: the channel/item state machine in [`translator`]
//! - **Geometry**: the Simple, GML and LatLong schemes in [`geometry`] and
//!   the GML collaborator boundary in [`gml`]
//! - **Metadata**: title/link/description/pubDate/enclosure resolution with
//!   per-call fallbacks in [`metadata`]
//! - **Output**: the `XmlSink` capability in [`sink`] and the GeoRSS output
//!   format wrapper in [`output`]
//!
//! # Example
//!
//! ```ignore
//! use georss::feed::{FeedMetadata, GeoRssOutputFormat, Gml3Encoder, EncodingScheme};
//!
//! let metadata = FeedMetadata::new(&templates, &catalog, "georss");
//! let format = GeoRssOutputFormat::new(metadata, &Gml3Encoder, EncodingScheme::Simple);
//! let summary = format.write(&request, collections, std::io::stdout().lock())?;
//! ```

pub mod date;
pub mod enclosure;
pub mod geometry;
pub mod gml;
pub mod metadata;
pub mod output;
pub mod sink;
pub mod translator;
pub mod types;

pub use date::{rfc3339, rfc3339_local};
pub use enclosure::parse_enclosures;
pub use geometry::{EncodingScheme, GeometryError, GeometryMarkup};
pub use gml::{Gml3Encoder, GmlElement, GmlEncoder, GmlError};
pub use metadata::{
    Catalog, CatalogError, FeatureTemplates, FeatureTypeInfo, FeedLinkError, FeedMetadata,
    ItemMetadata, TemplateError, FEED_URL_FALLBACK,
};
pub use output::{GeoRssOutputFormat, ServiceError, FORMAT_NAME, MIME_TYPE};
pub use sink::{SinkError, XmlSink, XmlWriter};
pub use translator::{EncodeOptions, EncodeSummary, FeedError, FeedTranslator, SkipReason};
pub use types::{
    AttributeValue, EnclosureRecord, FeatureRecord, FeedEntry, FeedRequest, FormatOptions,
    GeometryValue, TypeName,
};
