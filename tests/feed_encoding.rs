//! End-to-end encodes through the public API: attribute templates, the
//! static catalog and the built-in GML encoder behind `GeoRssOutputFormat`.

use chrono::{DateTime, Utc};
use geo::{line_string, point, polygon, Geometry, MultiPoint};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

use georss::catalog::StaticCatalog;
use georss::config::TemplateConfig;
use georss::feed::{
    rfc3339_local, AttributeValue, EncodingScheme, FeatureRecord, FeatureTypeInfo, FeedError,
    FeedMetadata, FeedRequest, FormatOptions, GeoRssOutputFormat, Gml3Encoder, TypeName,
    FORMAT_NAME,
};
use georss::templates::AttributeTemplates;

const BASE_URL: &str = "http://maps.example.org/geoserver/";

// ============================================================================
// Helpers
// ============================================================================

fn catalog() -> StaticCatalog {
    let mut types = HashMap::new();
    types.insert(
        "topp:poi".to_string(),
        FeatureTypeInfo {
            title: Some("Points of interest".to_string()),
            abstract_text: Some("Landmarks along the coast".to_string()),
        },
    );
    StaticCatalog::new(types)
}

fn template_config() -> TemplateConfig {
    TemplateConfig {
        title_attribute: Some("name".to_string()),
        pub_date_attribute: Some("updated".to_string()),
        enclosure_attribute: Some("media".to_string()),
    }
}

fn request(type_name: &str, options: &[(&str, &str)]) -> FeedRequest {
    FeedRequest {
        base_url: BASE_URL.to_string(),
        output_format: FORMAT_NAME.to_string(),
        queries: vec![TypeName::parse(type_name, "http://www.openplans.org/topp")],
        format_options: options.iter().copied().collect::<FormatOptions>(),
    }
}

fn render(
    templates: &AttributeTemplates,
    request: &FeedRequest,
    collections: Vec<Vec<FeatureRecord>>,
) -> (Result<georss::feed::EncodeSummary, georss::feed::ServiceError>, String) {
    let catalog = catalog();
    let metadata = FeedMetadata::new(templates, &catalog, "georss");
    let format = GeoRssOutputFormat::new(metadata, &Gml3Encoder, EncodingScheme::Simple);

    let mut out = Vec::new();
    let result = format.write(request, collections, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn poi(id: &str, name: &str, geometry: Option<Geometry<f64>>) -> FeatureRecord {
    FeatureRecord::new(id, geometry).with_attribute("name", AttributeValue::Text(name.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_feed_parses_as_rss() {
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let features = vec![
        poi("poi.1", "Lighthouse", Some(Geometry::Point(point!(x: -70.25, y: 43.62)))),
        poi("poi.2", "Harbor", Some(Geometry::Point(point!(x: -70.1, y: 43.5)))),
    ];
    let (result, xml) = render(&templates, &request("topp:poi", &[]), vec![features]);
    assert_eq!(result.unwrap().items, 2);

    let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
    assert_eq!(feed.entries.len(), 2);
    assert_eq!(
        feed.title.map(|t| t.content).as_deref(),
        Some("Points of interest")
    );
    assert_eq!(
        feed.entries[0].title.as_ref().map(|t| t.content.as_str()),
        Some("Lighthouse")
    );
}

#[test]
fn test_channel_metadata_from_catalog() {
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (_, xml) = render(&templates, &request("topp:poi", &[]), vec![]);

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains("<title>Points of interest</title>"));
    assert!(xml.contains("<description>Landmarks along the coast</description>"));
    assert!(xml.contains(
        "<link><![CDATA[http://maps.example.org/geoserver/wfs?request=GetFeature&typeName=topp%3Apoi&outputFormat=GeoRSS]]></link>"
    ));
}

#[test]
fn test_unknown_type_falls_back_to_system_name() {
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(&templates, &request("topp:rivers", &[]), vec![]);

    assert!(result.is_ok());
    assert!(xml.contains("<title>Auto-generated by georss</title>"));
    assert!(xml.contains("<description>Auto-generated by georss</description>"));
}

#[test]
fn test_item_metadata_from_attributes() {
    let updated: DateTime<chrono::FixedOffset> =
        DateTime::parse_from_rfc3339("2024-05-01T09:00:00+01:00").unwrap();
    let media = "url=http://media.example.org/tour.mp3\nlength=4096\ntype=audio/mpeg\n\
                 url=http://media.example.org/map.png\nlength=512\ntype=image/png";
    let feature = poi("poi.7", "Lighthouse", Some(Geometry::Point(point!(x: 1.5, y: 2.5))))
        .with_attribute("updated", AttributeValue::Date(updated))
        .with_attribute("media", AttributeValue::Text(media.to_string()));

    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(&templates, &request("topp:poi", &[]), vec![vec![feature]]);
    assert_eq!(result.unwrap().items, 1);

    let pub_date = rfc3339_local(updated.with_timezone(&Utc));
    assert!(xml.contains(&format!("<title>Lighthouse</title><pubDate>{pub_date}</pubDate>")));
    assert!(xml.contains(
        "<link><![CDATA[http://maps.example.org/geoserver/wfs?request=GetFeature&featureid=poi.7]]></link>"
    ));
    assert!(xml.contains(
        r#"<enclosure url="http://media.example.org/tour.mp3" length="4096" type="audio/mpeg"/><enclosure url="http://media.example.org/map.png" length="512" type="image/png"/>"#
    ));
    assert!(xml.contains("<georss:point>2.5 1.5</georss:point></item>"));
}

#[test]
fn test_missing_title_attribute_falls_back_to_id() {
    let feature = FeatureRecord::new("poi.8", Some(Geometry::Point(point!(x: 0.0, y: 0.0))));
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(&templates, &request("topp:poi", &[]), vec![vec![feature]]);

    assert_eq!(result.unwrap().skipped, 0);
    assert!(xml.contains("<item><title>poi.8</title>"));
}

#[test]
fn test_bad_base_url_drops_links() {
    let feature = poi("poi.1", "Lighthouse", Some(Geometry::Point(point!(x: 0.0, y: 0.0))));
    let templates = AttributeTemplates::new(template_config(), "not a url");
    let mut req = request("topp:poi", &[]);
    req.base_url = "not a url".to_string();
    let (result, xml) = render(&templates, &req, vec![vec![feature]]);

    assert_eq!(result.unwrap().items, 1);
    assert!(xml.contains("<link><![CDATA[Unable to create feed url]]></link>"));
    assert!(!xml.contains("<guid>"));
}

#[test]
fn test_multi_point_continuations() {
    let geometry = Geometry::MultiPoint(MultiPoint::new(vec![
        point!(x: 0.0, y: 10.0),
        point!(x: 1.0, y: 11.0),
        point!(x: 2.0, y: 12.0),
        point!(x: 3.0, y: 13.0),
    ]));
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(
        &templates,
        &request("topp:poi", &[("CONTINUATION", "TRUE")]),
        vec![vec![poi("poi.4", "Reefs", Some(geometry))]],
    );
    let summary = result.unwrap();

    assert_eq!(summary.items, 1);
    assert_eq!(summary.continuations, 3);
    let link = "http://maps.example.org/geoserver/wfs?request=GetFeature&featureid=poi.4";
    for i in 1..=3 {
        assert!(xml.contains(&format!("<guid><![CDATA[{link}#{i}]]></guid>")));
    }
    assert_eq!(xml.matches("<title>Continuation of Reefs</title>").count(), 3);

    let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
    assert_eq!(feed.entries.len(), 4);
}

#[test]
fn test_latlong_uses_centroid() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 4.0, y: 0.0),
        (x: 4.0, y: 2.0),
        (x: 0.0, y: 2.0),
        (x: 0.0, y: 0.0),
    ];
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(
        &templates,
        &request("topp:poi", &[("encoding", "latlong")]),
        vec![vec![
            poi("poi.1", "Bay", Some(Geometry::Polygon(square))),
            poi("poi.2", "Nowhere", None),
        ]],
    );
    let summary = result.unwrap();

    assert_eq!(summary.items, 1);
    assert_eq!(summary.skipped, 1);
    assert!(xml.contains(r#"xmlns:geo="http://www.w3.org/2003/01/geo/wgs84_pos#""#));
    assert!(xml.contains("<geo:lat>1</geo:lat><geo:long>2</geo:long>"));
    assert!(!xml.contains("Nowhere"));
}

#[test]
fn test_gml_encoding() {
    let road = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 2.0)];
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(
        &templates,
        &request("topp:poi", &[("encoding", "gml")]),
        vec![vec![poi("poi.1", "Road", Some(Geometry::LineString(road)))]],
    );

    assert_eq!(result.unwrap().items, 1);
    assert!(xml.contains(r#"xmlns:gml="http://www.opengis.net/gml""#));
    assert!(xml.contains(
        "<gml:LineString><gml:posList>0 0 2 1</gml:posList></gml:LineString></item>"
    ));
}

#[test]
fn test_gml_failure_aborts_feed() {
    let unsupported = Geometry::Rect(geo::Rect::new((0.0, 0.0), (1.0, 1.0)));
    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(
        &templates,
        &request("topp:poi", &[("encoding", "gml")]),
        vec![vec![
            poi("poi.1", "Box", Some(unsupported)),
            poi("poi.2", "After", Some(Geometry::Point(point!(x: 0.0, y: 0.0)))),
        ]],
    );

    let err = result.unwrap_err();
    assert!(matches!(err.cause(), FeedError::Gml { feature_id, .. } if feature_id == "poi.1"));
    assert!(!xml.contains("After"));
    assert!(!xml.ends_with("</rss>"));
}

#[test]
fn test_features_from_json() {
    let json = r#"[
        {"id": "poi.1", "attributes": {"name": "Lighthouse", "height": 31},
         "geometry": {"Point": {"x": -70.25, "y": 43.62}}},
        {"id": "poi.2", "attributes": {"name": "Dock"}}
    ]"#;
    let features: Vec<FeatureRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(features[0].attribute("height"), Some(&AttributeValue::Integer(31)));
    assert!(features[1].geometry.is_none());

    let templates = AttributeTemplates::new(template_config(), BASE_URL);
    let (result, xml) = render(&templates, &request("topp:poi", &[]), vec![features]);

    assert_eq!(result.unwrap().items, 2);
    assert!(xml.contains("<georss:point>43.62 -70.25</georss:point>"));
    assert!(xml.contains("<description><![CDATA[height: 31\nname: Lighthouse]]></description>"));
}
