//! Cache and compression response-header rules

use reqwest::header::{HeaderMap, CACHE_CONTROL, CONTENT_ENCODING, ETAG};

/// Cache-Control directives accepted without arguments
const CACHE_DIRECTIVES: &[&str] = &[
    "public",
    "private",
    "no-cache",
    "no-store",
    "no-transform",
    "must-revalidate",
    "proxy-revalidate",
];

/// Cache-Control directives that take a delta-seconds argument
const CACHE_AGE_DIRECTIVES: &[&str] = &["max-age", "s-maxage"];

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Checks Cache-Control and ETag headers, returning one message per problem
///
/// A missing ETag is allowed when the response is explicitly non-cacheable
/// (`no-cache` or `max-age=0`).
pub fn check_caching(headers: &HeaderMap) -> Vec<String> {
    let mut problems = Vec::new();
    let cache_control = header_text(headers, CACHE_CONTROL);

    match &cache_control {
        Some(value) if !is_valid_cache_control(value) => problems.push(format!(
            "Invalid Cache-Control header in response: {}",
            value
        )),
        Some(_) => {}
        None => problems.push("Missing Cache-Control header in response".to_string()),
    }

    match header_text(headers, ETAG) {
        Some(etag) if !is_valid_etag(&etag) => {
            problems.push(format!("Invalid ETag header in response: {}", etag))
        }
        Some(_) => {}
        None => {
            let exempt = cache_control.as_deref().is_some_and(is_non_cacheable);
            if !exempt {
                problems.push("Missing ETag header in response".to_string());
            }
        }
    }

    problems
}

/// Checks for a gzip or deflate Content-Encoding
pub fn check_compression(headers: &HeaderMap) -> Option<String> {
    match header_text(headers, CONTENT_ENCODING) {
        Some(value) => {
            let encoding = value.trim();
            if encoding.eq_ignore_ascii_case("gzip") || encoding.eq_ignore_ascii_case("deflate") {
                None
            } else {
                Some(format!(
                    "Invalid Content-Encoding header in response: {}",
                    value
                ))
            }
        }
        None => Some("Missing Content-Encoding header in response".to_string()),
    }
}

fn directives(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split(',').map(|d| d.trim().to_ascii_lowercase())
}

pub fn is_valid_cache_control(value: &str) -> bool {
    directives(value).all(|directive| {
        if CACHE_DIRECTIVES.contains(&directive.as_str()) {
            return true;
        }
        match directive.split_once('=') {
            Some((name, seconds)) => {
                CACHE_AGE_DIRECTIVES.contains(&name)
                    && !seconds.is_empty()
                    && seconds.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    })
}

fn is_non_cacheable(value: &str) -> bool {
    directives(value).any(|directive| directive == "no-cache" || directive == "max-age=0")
}

/// A quoted entity tag, optionally weak (`W/"..."`)
pub fn is_valid_etag(value: &str) -> bool {
    let tag = value.strip_prefix("W/").unwrap_or(value);
    tag.len() >= 2 && tag.starts_with('"') && tag.ends_with('"') && !tag[1..tag.len() - 1].contains('"')
}
