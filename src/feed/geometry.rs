//! Geometry encoding schemes.
//!
//! A scheme is chosen once per feed and applied to every entry:
//!
//! - [`EncodingScheme::Simple`]: `<georss:point>45.256 -71.92</georss:point>`,
//!   `<georss:line>` and `<georss:polygon>` (exterior ring only)
//! - [`EncodingScheme::Gml`]: a GML fragment such as
//!   `<gml:Point><gml:pos>45.256 -71.92</gml:pos></gml:Point>`, produced by
//!   a [`GmlEncoder`] collaborator
//! - [`EncodingScheme::LatLong`]: the centroid as
//!   `<geo:lat>45.256</geo:lat><geo:long>-71.92</geo:long>`
//!
//! Encoding is split in two. [`EncodingScheme::markup`] is pure and decides
//! what an entry will carry; [`GeometryMarkup::write`] streams it. Only the
//! GML path can fail while writing.

use geo::{Centroid, Coord, Geometry, LineString};
use serde::Deserialize;
use std::borrow::Cow;
use thiserror::Error;

use super::gml::{GmlElement, GmlEncoder, GmlError};
use super::sink::{SinkError, XmlSink};
use super::types::GeometryValue;

pub const GEORSS_PREFIX: &str = "georss";
pub const GEORSS_NAMESPACE: &str = "http://www.georss.org/georss";
pub const GML_PREFIX: &str = "gml";
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml";
pub const GEO_PREFIX: &str = "geo";
pub const GEO_NAMESPACE: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#";

/// Per-feature geometry failures detected before anything is written.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The geometry has no coordinates to derive a centroid from.
    #[error("geometry is empty, no centroid can be computed")]
    NoCentroid,
}

/// Errors raised while streaming geometry markup.
#[derive(Debug, Error)]
pub enum MarkupWriteError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Cannot transform the specified geometry in GML: {0}")]
    Gml(#[source] GmlError),
}

/// The closed set of geometry serializations a feed can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingScheme {
    #[default]
    Simple,
    Gml,
    LatLong,
}

impl EncodingScheme {
    /// Maps an `encoding` format option value to a scheme.
    ///
    /// Matching is case-insensitive; anything unrecognized selects
    /// [`EncodingScheme::Simple`].
    pub fn from_option(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "gml" => EncodingScheme::Gml,
            "latlong" => EncodingScheme::LatLong,
            _ => EncodingScheme::Simple,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            EncodingScheme::Simple => GEORSS_PREFIX,
            EncodingScheme::Gml => GML_PREFIX,
            EncodingScheme::LatLong => GEO_PREFIX,
        }
    }

    pub fn namespace_uri(&self) -> &'static str {
        match self {
            EncodingScheme::Simple => GEORSS_NAMESPACE,
            EncodingScheme::Gml => GML_NAMESPACE,
            EncodingScheme::LatLong => GEO_NAMESPACE,
        }
    }

    /// Decides the markup for one geometry.
    ///
    /// A multi-part geometry holding a single member is treated as that
    /// member. `Ok(None)` means no element is emitted, which is what
    /// [`EncodingScheme::Simple`] does for empty geometries and for kinds it
    /// has no element for.
    pub fn markup(&self, geometry: &GeometryValue) -> Result<Option<GeometryMarkup>, GeometryError> {
        let geometry: &GeometryValue = &degenerate(geometry);
        match self {
            EncodingScheme::Simple => Ok(simple_markup(geometry)),
            EncodingScheme::Gml => Ok(Some(GeometryMarkup::Gml {
                element: GmlElement::for_geometry(geometry),
                geometry: geometry.clone(),
            })),
            EncodingScheme::LatLong => {
                let centroid = geometry.centroid().ok_or(GeometryError::NoCentroid)?;
                Ok(Some(GeometryMarkup::LatLong {
                    lat: centroid.y(),
                    lon: centroid.x(),
                }))
            }
        }
    }
}

/// Geometry content of one entry, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryMarkup {
    /// A single `georss:*` element with "lat lon" pairs as content.
    Simple {
        element: &'static str,
        content: String,
    },
    LatLong {
        lat: f64,
        lon: f64,
    },
    /// Delegated to the GML encoder at write time.
    Gml {
        element: GmlElement,
        geometry: GeometryValue,
    },
}

impl GeometryMarkup {
    pub fn write(&self, sink: &mut dyn XmlSink, gml: &dyn GmlEncoder) -> Result<(), MarkupWriteError> {
        match self {
            GeometryMarkup::Simple { element, content } => sink.element(element, content)?,
            GeometryMarkup::LatLong { lat, lon } => {
                sink.element("geo:lat", &lat.to_string())?;
                sink.element("geo:long", &lon.to_string())?;
            }
            GeometryMarkup::Gml { element, geometry } => gml
                .encode(geometry, *element, sink)
                .map_err(MarkupWriteError::Gml)?,
        }
        Ok(())
    }
}

/// Returns the members of a multi-part geometry, or `None` for a
/// single-part one.
pub fn members(geometry: &GeometryValue) -> Option<Vec<GeometryValue>> {
    match geometry {
        Geometry::MultiPoint(multi) => Some(multi.iter().copied().map(Geometry::Point).collect()),
        Geometry::MultiLineString(multi) => {
            Some(multi.iter().cloned().map(Geometry::LineString).collect())
        }
        Geometry::MultiPolygon(multi) => Some(multi.iter().cloned().map(Geometry::Polygon).collect()),
        Geometry::GeometryCollection(collection) => Some(collection.iter().cloned().collect()),
        _ => None,
    }
}

fn degenerate(geometry: &GeometryValue) -> Cow<'_, GeometryValue> {
    match members(geometry) {
        Some(mut parts) if parts.len() == 1 => Cow::Owned(parts.remove(0)),
        _ => Cow::Borrowed(geometry),
    }
}

fn simple_markup(geometry: &GeometryValue) -> Option<GeometryMarkup> {
    let (element, content) = match geometry {
        Geometry::Point(point) => ("georss:point", lat_lon(point.0)),
        Geometry::LineString(line) => ("georss:line", lat_lon_list(line)?),
        Geometry::Polygon(polygon) => ("georss:polygon", lat_lon_list(polygon.exterior())?),
        _ => return None,
    };
    Some(GeometryMarkup::Simple {
        element,
        content,
    })
}

/// "lat lon" for one coordinate.
pub fn lat_lon(coord: Coord<f64>) -> String {
    format!("{} {}", coord.y, coord.x)
}

/// Space-joined "lat lon" pairs, or `None` for an empty line.
pub fn lat_lon_list(line: &LineString<f64>) -> Option<String> {
    if line.0.is_empty() {
        return None;
    }
    let pairs: Vec<String> = line.coords().map(|c| lat_lon(*c)).collect();
    Some(pairs.join(" "))
}
