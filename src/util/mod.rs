//! Utility functions shared by the feed encoder and its collaborators.
//!
//! - **Service URLs**: joining a service base URL with an endpoint path and
//!   an ordered set of query parameters
//!
//! # Examples
//!
//! ```
//! use georss::util::build_service_url;
//!
//! let url = build_service_url("http://localhost:8080/geoserver/", "wfs", &[]).unwrap();
//! assert_eq!(url.as_str(), "http://localhost:8080/geoserver/wfs");
//! ```

mod service_url;

pub use service_url::build_service_url;
