use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::geometry::GeometryMarkup;

/// Geometry carried by a feature record.
///
/// Coordinates are stored in x/y (longitude/latitude) order and emitted
/// as "lat lon" text by the encoders.
pub type GeometryValue = geo::Geometry<f64>;

// ============================================================================
// Request
// ============================================================================

/// Qualified name of a requested feature type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Namespace prefix, e.g. `topp`. May be empty.
    pub prefix: String,
    /// Local part, e.g. `states`.
    pub local: String,
    /// Namespace URI the prefix is bound to. May be empty.
    pub namespace: String,
}

impl TypeName {
    pub fn new(prefix: &str, local: &str, namespace: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Parses `prefix:local` (or a bare `local`) with the given namespace URI.
    pub fn parse(qualified: &str, namespace: &str) -> Self {
        match qualified.split_once(':') {
            Some((prefix, local)) => Self::new(prefix, local, namespace),
            None => Self::new("", qualified, namespace),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

/// Format options attached to a request.
///
/// Keys are case-insensitive; they are normalized to upper case on insert
/// and lookup. Values are kept verbatim.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions(HashMap<String, String>);

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_uppercase(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_uppercase()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for FormatOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (key, value) in iter {
            options.insert(key.as_ref(), value.as_ref());
        }
        options
    }
}

/// The operation context of one encode: where the service lives, what
/// was asked for, and how the feed should be shaped.
///
/// Immutable for the duration of an encode.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    /// Base URL of the service, e.g. `http://localhost:8080/geoserver/`.
    pub base_url: String,
    /// Requested output format name, echoed into the feed link.
    pub output_format: String,
    /// Requested feature types, in request order.
    pub queries: Vec<TypeName>,
    pub format_options: FormatOptions,
}

// ============================================================================
// Features
// ============================================================================

/// A single attribute value of a feature record.
///
/// Deserialized untagged: RFC3339 strings become [`AttributeValue::Date`],
/// any other string stays [`AttributeValue::Text`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(DateTime<FixedOffset>),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Integer(v) => write!(f, "{v}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Date(v) => write!(f, "{}", v.to_rfc3339()),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

/// A geographic feature as supplied by the upstream collection.
///
/// The encoder only ever borrows records; it never mutates them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureRecord {
    /// Stable identifier, e.g. `states.12`.
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Default geometry, if the feature has one.
    #[serde(default)]
    pub geometry: Option<GeometryValue>,
}

impl FeatureRecord {
    pub fn new(id: &str, geometry: Option<GeometryValue>) -> Self {
        Self {
            id: id.to_string(),
            attributes: BTreeMap::new(),
            geometry,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

// ============================================================================
// Entries
// ============================================================================

/// A feed-entry attachment descriptor.
///
/// Only ever constructed complete: all three fields were observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosureRecord {
    pub url: String,
    pub length: String,
    pub mime_type: String,
}

/// One `<item>` of the feed, derived transiently from a feature.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: String,
    /// Omitted from the output when `None`.
    pub pub_date: Option<String>,
    pub enclosures: Vec<EnclosureRecord>,
    /// Geometry markup for this entry; `None` emits no geometry element.
    pub geometry: Option<GeometryMarkup>,
    /// Entries for members 1..N of a multi-part geometry, in member order.
    pub continuations: Vec<FeedEntry>,
}
