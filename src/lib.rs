//! Encodes geographic feature collections as RSS 2.0 feeds tagged with
//! GeoRSS, GML or W3C lat/long geometry.

pub mod catalog;
pub mod config;
pub mod feed;
pub mod templates;
pub mod util;
