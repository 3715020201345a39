//! Cache key derivation
//!
//! A URL is mapped to a file name by sanitizing its normalized form. The
//! sanitization is lossy (`a/b_c` and `a_b/c` sanitize identically), so a
//! SHA-256 prefix of the full normalized URL is appended to keep keys unique.

use crate::url::normalize_url;
use sha2::{Digest, Sha256};

/// Maximum number of readable characters kept from the URL
const MAX_STEM_LEN: usize = 96;

/// Number of hex characters of the URL digest appended to the key
const DIGEST_HEX_LEN: usize = 16;

/// Extension of cache record files
pub(crate) const RECORD_EXTENSION: &str = "json";

/// Derives the record file name for a URL
///
/// URLs that fail normalization are keyed on their trimmed raw text.
///
/// # Examples
///
/// ```
/// use tiered_crawler::cache::cache_key;
///
/// let key = cache_key("https://example.com/docs/");
/// assert!(key.starts_with("https___example.com_docs-"));
/// assert!(key.ends_with(".json"));
/// assert_eq!(key, cache_key("https://EXAMPLE.com/docs#intro"));
/// ```
pub fn cache_key(url: &str) -> String {
    let identity = normalize_url(url)
        .map(String::from)
        .unwrap_or_else(|_| url.trim().to_string());

    let stem: String = identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    let digest = hex::encode(Sha256::digest(identity.as_bytes()));

    format!(
        "{}-{}.{}",
        stem,
        &digest[..DIGEST_HEX_LEN],
        RECORD_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(
            cache_key("http://a.test/page"),
            cache_key("http://a.test/page")
        );
    }

    #[test]
    fn test_equivalent_urls_share_key() {
        assert_eq!(cache_key("http://a.test"), cache_key("http://A.test/"));
        assert_eq!(
            cache_key("http://a.test/page/"),
            cache_key("http://a.test/page#top")
        );
    }

    #[test]
    fn test_sanitization_collisions_are_disambiguated() {
        let first = cache_key("http://a.test/b_c");
        let second = cache_key("http://a.test/b/c");

        // Same readable stem, different digest
        assert_eq!(first.rsplit_once('-').unwrap().0, second.rsplit_once('-').unwrap().0);
        assert_ne!(first, second);
    }

    #[test]
    fn test_key_is_filesystem_safe() {
        let key = cache_key("https://example.com/a b/ü?x=1&y=../../etc");
        assert!(key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'));
        assert!(!key.contains('/'));
    }

    #[test]
    fn test_key_length_is_bounded() {
        let long = format!("https://example.com/{}", "x".repeat(1000));
        let key = cache_key(&long);
        assert_eq!(key.len(), MAX_STEM_LEN + 1 + DIGEST_HEX_LEN + 1 + RECORD_EXTENSION.len());
    }

    #[test]
    fn test_unparseable_url_still_has_key() {
        let key = cache_key("not a url");
        assert!(key.starts_with("not_a_url-"));
    }
}
