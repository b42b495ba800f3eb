use url::Url;

/// Extracts the netloc (lowercase host plus any explicit port) from a URL
///
/// URLs without a host (`data:`, `blob:`, unparseable input) yield an empty
/// string, so two host-less URLs compare as belonging to the same (empty)
/// domain.
///
/// # Examples
///
/// ```
/// use sitewarden::url::netloc;
///
/// assert_eq!(netloc("https://Example.com/path"), "example.com");
/// assert_eq!(netloc("https://example.com:8443/"), "example.com:8443");
/// assert_eq!(netloc("data:text/css,body{}"), "");
/// ```
pub fn netloc(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return String::new(),
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return String::new(),
    };

    match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    }
}

/// Checks whether two URLs belong to the same domain
///
/// Only the netloc components are compared; scheme and path are ignored.
pub fn is_same_domain(a: &str, b: &str) -> bool {
    netloc(a) == netloc(b)
}

/// Checks whether a URL is worth navigating at all
///
/// Returns false when the URL path ends in one of the configured non-page
/// extensions (documents, archives, executables, media, styles, scripts)
/// or when the scheme is neither http, https, nor empty (relative). This
/// gate runs before any navigation so a browser load is never wasted on a
/// resource that cannot be an HTML page.
///
/// # Arguments
///
/// * `url` - The URL to check (absolute or relative)
/// * `ignored_extensions` - Lowercase path extensions to reject
pub fn is_valid_url(url: &str, ignored_extensions: &[String]) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => {
            if !matches!(parsed.scheme(), "http" | "https") {
                return false;
            }
            parsed.path().to_lowercase()
        }
        // A relative reference has no scheme, which is allowed; strip any
        // query or fragment by hand before the extension check.
        Err(url::ParseError::RelativeUrlWithoutBase) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or("")
            .to_lowercase(),
        Err(_) => return false,
    };

    !ignored_extensions.iter().any(|ext| path.ends_with(ext))
}
