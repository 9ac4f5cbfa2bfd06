use url::Url;

/// Extracts the lower-cased host from a URL
///
/// Two URLs are on the same host when these strings are equal. The port
/// does not take part in the comparison.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_crawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs share the same host
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_host(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_no_host() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert_eq!(extract_host(&url), None);
    }

    #[test]
    fn test_same_host() {
        let a = Url::parse("http://a.test/").unwrap();
        let x = Url::parse("http://a.test/x").unwrap();
        let b = Url::parse("http://b.test/").unwrap();
        assert!(same_host(&a, &x));
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_subdomain_is_different_host() {
        let a = Url::parse("http://a.test/").unwrap();
        let sub = Url::parse("http://www.a.test/").unwrap();
        assert!(!same_host(&a, &sub));
    }
}
