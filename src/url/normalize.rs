use crate::UrlError;
use url::Url;

/// Canonicalizes an absolute URL
///
/// # Canonicalization Steps
///
/// 1. Reject schemes other than `http` and `https`
/// 2. Reject URLs without a host
/// 3. Lowercase the host
/// 4. Drop the port if it is the scheme's default
/// 5. Keep path and query as given
/// 6. Remove the fragment
///
/// The scheme is lower-cased by the parser itself.
///
/// # Examples
///
/// ```
/// use ripple_crawl::url::parse_canonical;
///
/// let url = parse_canonical("HTTP://Example.COM:80/Page?q=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/Page?q=1");
/// ```
pub fn canonical_url(url: &Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    if host.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    let mut canonical = url.clone();

    let lowered = host.to_lowercase();
    if lowered != host {
        canonical
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
    }

    if canonical.port().is_some() && canonical.port() == default_port(canonical.scheme()) {
        // Only fails for cannot-be-a-base URLs, which have no host and were rejected above
        let _ = canonical.set_port(None);
    }

    canonical.set_fragment(None);

    Ok(canonical)
}

/// Parses a URL string and canonicalizes it
pub fn parse_canonical(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonical_url(&url)
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}
