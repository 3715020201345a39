use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Parses a URL and checks that the crawler can fetch it
///
/// Only `http` and `https` URLs with a host are crawlable. Everything else
/// (`mailto:`, `javascript:`, relative references, garbage) is rejected.
///
/// # Examples
///
/// ```
/// use tiered_crawler::url::parse_crawlable;
///
/// assert!(parse_crawlable("https://example.com/a").is_ok());
/// assert!(parse_crawlable("mailto:someone@example.com").is_err());
/// ```
pub fn parse_crawlable(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Normalizes a URL into the identity used for cache records
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not http(s)
/// 2. Lowercase the host (done by the parser for http(s))
/// 3. Normalize the path:
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 4. Remove the fragment
/// 5. Remove tracking query parameters and sort the rest
/// 6. Remove an empty query string
///
/// The scheme and any `www.` prefix are preserved: they can name different
/// sites, and merging them would serve one site's links for another.
///
/// # Examples
///
/// ```
/// use tiered_crawler::url::normalize_url;
///
/// let url = normalize_url("http://Example.COM/docs//intro/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs/intro");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = parse_crawlable(url_str)?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Collapses empty segments and strips the trailing slash
///
/// Dot segments are already resolved by the URL parser.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
