use serde::Deserialize;

/// Main configuration structure for Sumi-Check
///
/// An immutable snapshot of the run options. Every section is optional in
/// the TOML file; omitted switches default to off.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pages to verify, in order. Entries without a scheme are local files.
    #[serde(default)]
    pub pages: Vec<String>,

    #[serde(default)]
    pub checks: ChecksConfig,

    #[serde(default)]
    pub links: LinkPolicyConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Creates a configuration for the given pages with every check disabled
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

/// Which page-level checks run
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ChecksConfig {
    /// Extract and verify every resource a page references
    #[serde(default)]
    pub links: bool,

    /// Parse each page as strict XHTML
    #[serde(default)]
    pub xhtml: bool,

    /// Require Cache-Control and ETag response headers
    #[serde(default)]
    pub caching: bool,

    /// Require a gzip or deflate Content-Encoding
    #[serde(default)]
    pub compression: bool,

    /// Flag pages slower than this many milliseconds
    #[serde(default)]
    pub max_response_time: Option<u64>,
}

/// Policies applied to extracted links
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LinkPolicyConfig {
    /// Treat any 3xx link response as an issue instead of following it
    #[serde(default)]
    pub no_redirects: bool,

    /// Flag links that point at localhost or a loopback address
    #[serde(default)]
    pub no_local_links: bool,

    /// Flag links ending in a bare `#`
    #[serde(default)]
    pub no_empty_fragments: bool,

    /// Only check links whose host matches the page's host
    #[serde(default)]
    pub only_same_domain: bool,

    /// Verify `sha1`/`md5`/`crc32` digests carried in link query strings
    #[serde(default)]
    pub query_hashes: bool,

    /// Flag plain `http:` links
    #[serde(default)]
    pub prefer_secure: bool,

    /// Links skipped entirely (exact match)
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// HTTP client behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header value; an empty string sends no header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

/// Report presentation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Emit a grouped summary of all issues at the end of the run
    #[serde(default)]
    pub summary: bool,
}

/// The library identifier sent as User-Agent unless overridden
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    60
}
