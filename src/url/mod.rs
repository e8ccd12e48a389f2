//! URL handling module for Sumi-Check
//!
//! This module classifies targets by scheme, resolves references against the
//! page they appear on, derives deduplication keys and recognizes local hosts.

mod localhost;
mod normalize;

// Re-export main functions
pub use localhost::is_local_host;
pub use normalize::{dedup_key, is_supported_scheme, normalize_page, resolve_link};

/// How a target is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// `http:` or `https:`
    Network,
    /// `file:`
    LocalFile,
}

impl TargetKind {
    /// Classifies a URL by scheme, returning None for unsupported schemes
    pub fn of(url: &::url::Url) -> Option<Self> {
        match url.scheme() {
            "http" | "https" => Some(Self::Network),
            "file" => Some(Self::LocalFile),
            _ => None,
        }
    }
}
