use crate::{UrlError, UrlResult};
use std::path::Path;
use url::{ParseError, Url};

/// Schemes the checker knows how to fetch
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file"];

/// Returns true if targets with this scheme can be fetched
pub fn is_supported_scheme(scheme: &str) -> bool {
    SUPPORTED_SCHEMES.contains(&scheme)
}

/// Normalizes a caller-supplied page string into a target URL
///
/// Strings that already carry a scheme are parsed as-is; anything else is a
/// filesystem path, resolved against the current directory and turned into a
/// `file:` URL.
///
/// # Examples
///
/// ```
/// use sumi_check::url::normalize_page;
///
/// let url = normalize_page("https://example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
///
/// let url = normalize_page("/srv/site/index.html").unwrap();
/// assert_eq!(url.as_str(), "file:///srv/site/index.html");
/// ```
pub fn normalize_page(page: &str) -> UrlResult<Url> {
    let page = page.trim();

    match Url::parse(page) {
        Ok(url) => {
            if !is_supported_scheme(url.scheme()) {
                return Err(UrlError::InvalidScheme(url.scheme().to_string()));
            }
            Ok(url)
        }
        Err(ParseError::RelativeUrlWithoutBase) => local_file_url(page),
        Err(e) => Err(UrlError::Parse(e.to_string())),
    }
}

fn local_file_url(path: &str) -> UrlResult<Url> {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| UrlError::LocalPath(e.to_string()))?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| UrlError::LocalPath(absolute.display().to_string()))
}

/// Resolves a link reference against the page it appears on
///
/// Returns None if the reference is blank, cannot be resolved, or resolves to
/// a scheme the checker does not fetch (`mailto:`, `javascript:`, `data:` ...).
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if is_supported_scheme(resolved.scheme()) {
        Some(resolved)
    } else {
        None
    }
}

/// Returns the deduplication key for a target: its URL without the fragment
pub fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}
