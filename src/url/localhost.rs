use url::{Host, Url};

/// Returns true if the URL's host is a recognized localhost form
///
/// Matches the domain `localhost`, any address in `127.0.0.0/8` and `::1`.
/// IPv6 literals are parsed by the URL parser, so every textual spelling of
/// `::1` (`[0:0:0:0:0:0:0:1]`, `[::0001]` ...) is recognized.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_check::url::is_local_host;
///
/// assert!(is_local_host(&Url::parse("http://localhost:8080/").unwrap()));
/// assert!(is_local_host(&Url::parse("http://127.4.5.6/").unwrap()));
/// assert!(is_local_host(&Url::parse("http://[0:0:0:0:0:0:0:1]/").unwrap()));
/// assert!(!is_local_host(&Url::parse("http://example.com/").unwrap()));
/// ```
pub fn is_local_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}
