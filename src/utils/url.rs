// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Whether a URL carries an `http://` or `https://` scheme.
pub fn is_absolute(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Prefix a relative link with the base URL, leaving absolute URLs untouched.
///
/// # Examples
/// ```
/// use fixture_crawler::utils::url::absolutize;
///
/// assert_eq!(
///     absolutize("https://example.com", "/img/logo.png"),
///     "https://example.com/img/logo.png"
/// );
/// assert_eq!(
///     absolutize("https://example.com", "https://cdn.example.com/a.png"),
///     "https://cdn.example.com/a.png"
/// );
/// ```
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if is_absolute(href) {
        return href.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

/// Value of a query parameter, matched case-insensitively on the key.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.into_owned())
}

/// Last non-empty path segment, without query or fragment.
pub fn last_path_segment(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    let path = url.split(['?', '#']).next()?;
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
