use url::Url;

/// Normalizes a URL into the canonical form used for identity comparisons
///
/// # Normalization Steps
///
/// 1. Parse the URL; unparseable input is returned verbatim so identity
///    comparison still works for dedup keys
/// 2. Lowercase the host
/// 3. Remove default ports (80 for http, 443 for https)
/// 4. Force a trailing slash on the path, except when the path is empty or
///    already `/`
/// 5. Drop the query string and fragment
///
/// The function is pure, deterministic, and idempotent:
/// `normalize_url(normalize_url(u)) == normalize_url(u)`.
///
/// # Arguments
///
/// * `url` - The URL string to normalize
///
/// # Returns
///
/// The canonical string form of the URL
///
/// # Examples
///
/// ```
/// use sitewarden::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTP://Example.com:80/Path?q=1#frag"),
///     "http://example.com/Path/"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return url.to_string(),
    };

    // Url::parse already strips ports that are the scheme default, so any
    // remaining port is significant and kept.
    let netloc = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };

    let path = parsed.path();
    let path = if path.is_empty() {
        "/".to_string()
    } else if path != "/" && !path.ends_with('/') {
        format!("{}/", path)
    } else {
        path.to_string()
    };

    format!("{}://{}{}", parsed.scheme(), netloc, path)
}
