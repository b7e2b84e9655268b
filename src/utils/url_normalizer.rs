//! Destination URL validation and normalization.
//!
//! Redirect targets must be absolute `http`/`https` URLs with a host. The
//! canonical form lowercases the host and drops default ports so click
//! statistics group identical targets together. Fragments and query strings
//! are kept: they are part of where the visitor lands.

use url::Url;

/// Longest destination URL accepted.
pub const MAX_URL_LEN: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL is longer than {MAX_URL_LEN} characters")]
    TooLong,
}

/// Normalizes a destination URL to its canonical form.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for relative or malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes
/// such as `javascript:` or `data:`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://Shop.Example.COM:443/Sale#top").unwrap(),
///     "https://shop.example.com/Sale#top"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.len() > MAX_URL_LEN {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?
        .to_ascii_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        // Cannot fail for http(s) URLs, which always have a host
        let _ = url.set_port(None);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_host_only() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_adds_root_path() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_normalize_drops_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/a").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:443/a").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_normalize_keeps_custom_port() {
        assert_eq!(
            normalize_url("http://localhost:3000/landing").unwrap(),
            "http://localhost:3000/landing"
        );
    }

    #[test]
    fn test_normalize_keeps_fragment_and_query() {
        assert_eq!(
            normalize_url("https://example.com/page?utm_source=split#offer").unwrap(),
            "https://example.com/page?utm_source=split#offer"
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_url("  https://example.com/a  ").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_normalize_ip_address() {
        assert_eq!(
            normalize_url("http://192.168.1.1:8080/api").unwrap(),
            "http://192.168.1.1:8080/api"
        );
    }

    #[test]
    fn test_normalize_rejects_relative_url() {
        assert!(matches!(
            normalize_url("/landing"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_url("example.com"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_url(""),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_other_schemes() {
        for input in [
            "ftp://example.com/file.txt",
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "mailto:test@example.com",
        ] {
            assert!(
                matches!(
                    normalize_url(input),
                    Err(UrlNormalizationError::UnsupportedProtocol)
                ),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_normalize_rejects_oversized_url() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(matches!(
            normalize_url(&url),
            Err(UrlNormalizationError::TooLong)
        ));
    }
}
