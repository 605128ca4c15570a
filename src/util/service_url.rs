use url::Url;

/// Builds a service URL: `base` joined with `path`, plus query parameters
/// in the given order.
///
/// The base is treated as a directory, so `http://host/geoserver` and
/// `http://host/geoserver/` both resolve `wfs` to `http://host/geoserver/wfs`.
///
/// # Errors
///
/// Returns [`url::ParseError`] if `base` is not an absolute URL or the
/// joined path cannot be resolved.
///
/// # Examples
///
/// ```
/// use georss::util::build_service_url;
///
/// let url = build_service_url(
///     "http://localhost:8080/geoserver",
///     "wfs",
///     &[("request", "GetFeature"), ("typeName", "topp:states")],
/// )
/// .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "http://localhost:8080/geoserver/wfs?request=GetFeature&typeName=topp%3Astates"
/// );
/// ```
pub fn build_service_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let directory = format!("{}/", base.path());
        base.set_path(&directory);
    }

    let mut url = base.join(path)?;
    url.set_query(None);
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter().copied());
    }
    Ok(url)
}
