//! Content-hash verification
//!
//! Links may carry an expected digest in their query string, e.g.
//! `archive.zip?sha1=9511fa1a787d021bdf3aa9538029a44209fb5c4c`. This module
//! extracts that expectation and computes the digest incrementally over a
//! response body.

use md5::Md5;
use sha1::{Digest, Sha1};
use std::fmt;
use url::Url;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
    Crc32,
}

impl HashAlgorithm {
    /// Query parameter names, in lookup order
    pub const ALL: [Self; 3] = [Self::Sha1, Self::Md5, Self::Crc32];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            Self::Crc32 => "crc32",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digest a link's body is expected to hash to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedHash {
    pub algorithm: HashAlgorithm,
    pub digest: String,
}

impl ExpectedHash {
    /// Extracts the expected digest from a URL's query string
    ///
    /// When several algorithms are present the first of `sha1`, `md5`,
    /// `crc32` wins. Parameter names are matched case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use sumi_check::integrity::{ExpectedHash, HashAlgorithm};
    ///
    /// let url = Url::parse("https://example.com/a.zip?md5=ABC123").unwrap();
    /// let expected = ExpectedHash::from_url(&url).unwrap();
    /// assert_eq!(expected.algorithm, HashAlgorithm::Md5);
    /// assert_eq!(expected.digest, "ABC123");
    /// ```
    pub fn from_url(url: &Url) -> Option<Self> {
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        HashAlgorithm::ALL.iter().find_map(|algorithm| {
            pairs
                .iter()
                .find(|(name, value)| {
                    name.eq_ignore_ascii_case(algorithm.as_str()) && !value.is_empty()
                })
                .map(|(_, value)| Self {
                    algorithm: *algorithm,
                    digest: value.clone(),
                })
        })
    }

    /// Compares against a computed hex digest, ignoring case
    pub fn matches(&self, actual: &str) -> bool {
        self.digest.eq_ignore_ascii_case(actual)
    }

    /// Starts an incremental digest for this expectation's algorithm
    pub fn hasher(&self) -> StreamDigest {
        StreamDigest::new(self.algorithm)
    }
}

/// An incremental digest fed chunk by chunk
pub enum StreamDigest {
    Sha1(Sha1),
    Md5(Md5),
    Crc32(crc32fast::Hasher),
}

impl StreamDigest {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            HashAlgorithm::Md5 => Self::Md5(Md5::new()),
            HashAlgorithm::Crc32 => Self::Crc32(crc32fast::Hasher::new()),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha1(hasher) => hasher.update(chunk),
            Self::Md5(hasher) => hasher.update(chunk),
            Self::Crc32(hasher) => hasher.update(chunk),
        }
    }

    /// Finishes the digest as lowercase hex
    pub fn finalize_hex(self) -> String {
        match self {
            Self::Sha1(hasher) => hex::encode(hasher.finalize()),
            Self::Md5(hasher) => hex::encode(hasher.finalize()),
            Self::Crc32(hasher) => format!("{:08x}", hasher.finalize()),
        }
    }
}
