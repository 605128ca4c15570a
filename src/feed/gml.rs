use geo::{Geometry, LineString, Point, Polygon};
use thiserror::Error;

use super::geometry::{lat_lon, lat_lon_list};
use super::sink::{SinkError, XmlSink};
use super::types::GeometryValue;

/// Errors raised by a GML fragment encoder.
#[derive(Debug, Error)]
pub enum GmlError {
    /// The encoder has no GML representation for this geometry kind.
    #[error("no GML encoding for {kind} geometries")]
    Unsupported { kind: &'static str },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// GML element a geometry is encoded as, chosen by geometry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmlElement {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    /// Abstract `gml:_Geometry`, used for every other kind.
    Geometry,
}

impl GmlElement {
    pub fn for_geometry(geometry: &GeometryValue) -> Self {
        match geometry {
            Geometry::Point(_) => GmlElement::Point,
            Geometry::LineString(_) => GmlElement::LineString,
            Geometry::Polygon(_) => GmlElement::Polygon,
            Geometry::MultiPoint(_) => GmlElement::MultiPoint,
            Geometry::MultiLineString(_) => GmlElement::MultiLineString,
            Geometry::MultiPolygon(_) => GmlElement::MultiPolygon,
            _ => GmlElement::Geometry,
        }
    }

    /// Prefixed element name, e.g. `gml:Point`.
    pub fn qualified_name(&self) -> &'static str {
        match self {
            GmlElement::Point => "gml:Point",
            GmlElement::LineString => "gml:LineString",
            GmlElement::Polygon => "gml:Polygon",
            GmlElement::MultiPoint => "gml:MultiPoint",
            GmlElement::MultiLineString => "gml:MultiLineString",
            GmlElement::MultiPolygon => "gml:MultiPolygon",
            GmlElement::Geometry => "gml:_Geometry",
        }
    }
}

/// Geometry-to-GML collaborator.
///
/// Writes one GML fragment rooted at `element` into the sink. A failure
/// may leave a partially written fragment behind.
pub trait GmlEncoder {
    fn encode(
        &self,
        geometry: &GeometryValue,
        element: GmlElement,
        sink: &mut dyn XmlSink,
    ) -> Result<(), GmlError>;
}

/// GML 3 fragment encoder with "lat lon" coordinate order.
///
/// ```text
/// <gml:Point><gml:pos>45.256 -71.92</gml:pos></gml:Point>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Gml3Encoder;

impl GmlEncoder for Gml3Encoder {
    fn encode(
        &self,
        geometry: &GeometryValue,
        element: GmlElement,
        sink: &mut dyn XmlSink,
    ) -> Result<(), GmlError> {
        match (element, geometry) {
            (GmlElement::Point, Geometry::Point(point)) => write_point(sink, point)?,
            (GmlElement::LineString, Geometry::LineString(line)) => write_line(sink, line)?,
            (GmlElement::Polygon, Geometry::Polygon(polygon)) => write_polygon(sink, polygon)?,
            (GmlElement::MultiPoint, Geometry::MultiPoint(multi)) => {
                sink.start("gml:MultiPoint", &[])?;
                for point in multi.iter() {
                    sink.start("gml:pointMember", &[])?;
                    write_point(sink, point)?;
                    sink.end("gml:pointMember")?;
                }
                sink.end("gml:MultiPoint")?;
            }
            (GmlElement::MultiLineString, Geometry::MultiLineString(multi)) => {
                sink.start("gml:MultiLineString", &[])?;
                for line in multi.iter() {
                    sink.start("gml:lineStringMember", &[])?;
                    write_line(sink, line)?;
                    sink.end("gml:lineStringMember")?;
                }
                sink.end("gml:MultiLineString")?;
            }
            (GmlElement::MultiPolygon, Geometry::MultiPolygon(multi)) => {
                sink.start("gml:MultiPolygon", &[])?;
                for polygon in multi.iter() {
                    sink.start("gml:polygonMember", &[])?;
                    write_polygon(sink, polygon)?;
                    sink.end("gml:polygonMember")?;
                }
                sink.end("gml:MultiPolygon")?;
            }
            (_, geometry) => {
                return Err(GmlError::Unsupported {
                    kind: kind_name(geometry),
                })
            }
        }
        Ok(())
    }
}

fn write_point(sink: &mut dyn XmlSink, point: &Point<f64>) -> Result<(), SinkError> {
    sink.start("gml:Point", &[])?;
    sink.element("gml:pos", &lat_lon(point.0))?;
    sink.end("gml:Point")
}

fn write_line(sink: &mut dyn XmlSink, line: &LineString<f64>) -> Result<(), SinkError> {
    sink.start("gml:LineString", &[])?;
    sink.element("gml:posList", &lat_lon_list(line).unwrap_or_default())?;
    sink.end("gml:LineString")
}

fn write_ring(sink: &mut dyn XmlSink, boundary: &str, ring: &LineString<f64>) -> Result<(), SinkError> {
    sink.start(boundary, &[])?;
    sink.start("gml:LinearRing", &[])?;
    sink.element("gml:posList", &lat_lon_list(ring).unwrap_or_default())?;
    sink.end("gml:LinearRing")?;
    sink.end(boundary)
}

fn write_polygon(sink: &mut dyn XmlSink, polygon: &Polygon<f64>) -> Result<(), SinkError> {
    sink.start("gml:Polygon", &[])?;
    write_ring(sink, "gml:exterior", polygon.exterior())?;
    for interior in polygon.interiors() {
        write_ring(sink, "gml:interior", interior)?;
    }
    sink.end("gml:Polygon")
}

fn kind_name(geometry: &GeometryValue) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
