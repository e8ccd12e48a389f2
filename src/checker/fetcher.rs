//! Content fetcher implementation
//!
//! This module performs every request the checker makes:
//! - Building HTTP clients with the configured user agent and cache-busting headers
//! - HEAD probes and full GET requests for network targets
//! - Stat probes and file reads for `file:` targets
//! - Incremental body streaming and Content-Encoding decoding

use crate::config::HttpConfig;
use crate::state::RequestMode;
use crate::url::TargetKind;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT_ENCODING, CACHE_CONTROL, CONTENT_ENCODING, PRAGMA,
};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use url::Url;

/// Maximum redirect hops followed when redirects are allowed
pub const MAX_REDIRECTS: usize = 10;

/// Transport-level failures
///
/// These terminate the check that hit them and are recorded as issues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{source}, open '{path}'")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("not a local file path: {0}")]
    InvalidPath(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("cannot decode {encoding} content: {source}")]
    Decode {
        encoding: String,
        source: std::io::Error,
    },
}

/// Per-request options
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Follow redirects (bounded by [`MAX_REDIRECTS`])
    pub follow_redirects: bool,

    /// Advertise `Accept-Encoding: gzip, deflate`
    pub accept_compressed: bool,
}

/// A response body that has not been read yet
#[derive(Debug)]
pub enum Body {
    /// Probes carry no body
    Empty,
    Http(reqwest::Response),
    File { file: tokio::fs::File, path: String },
}

impl Body {
    /// Streams the body chunk by chunk into `consume`
    ///
    /// Returns the number of bytes read.
    pub async fn drain_into<F>(self, mut consume: F) -> Result<u64, FetchError>
    where
        F: FnMut(&[u8]),
    {
        let mut total = 0u64;

        match self {
            Body::Empty => {}
            Body::Http(mut response) => {
                while let Some(chunk) = response.chunk().await? {
                    total += chunk.len() as u64;
                    consume(&chunk[..]);
                }
            }
            Body::File { mut file, path } => {
                let mut buf = vec![0u8; 8192];
                loop {
                    let read = file
                        .read(&mut buf)
                        .await
                        .map_err(|source| FetchError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    if read == 0 {
                        break;
                    }
                    total += read as u64;
                    consume(&buf[..read]);
                }
            }
        }

        Ok(total)
    }

    /// Reads the whole body into memory
    pub async fn read_all(self) -> Result<Vec<u8>, FetchError> {
        let mut bytes = Vec::new();
        self.drain_into(|chunk| bytes.extend_from_slice(chunk))
            .await?;
        Ok(bytes)
    }
}

/// Status, headers and final location of a request, plus its unread body
#[derive(Debug)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// URL after following any redirects
    pub final_url: Url,
    pub body: Body,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value as text (header names are case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Issues probes and full requests for network and local-file targets
#[derive(Debug, Clone)]
pub struct Fetcher {
    following: Client,
    non_following: Client,
}

impl Fetcher {
    /// Builds the redirect-following and non-following HTTP clients
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            following: build_http_client(config, true)?,
            non_following: build_http_client(config, false)?,
        })
    }

    /// Lightweight existence check
    pub async fn probe(&self, url: &Url, options: FetchOptions) -> Result<FetchResponse, FetchError> {
        self.request(url, RequestMode::Probe, options).await
    }

    /// Full request, body left unread in the response
    pub async fn fetch(&self, url: &Url, options: FetchOptions) -> Result<FetchResponse, FetchError> {
        self.request(url, RequestMode::Full, options).await
    }

    async fn request(
        &self,
        url: &Url,
        mode: RequestMode,
        options: FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        match TargetKind::of(url) {
            Some(TargetKind::Network) => self.request_http(url, mode, options).await,
            Some(TargetKind::LocalFile) => request_file(url, mode).await,
            None => Err(FetchError::UnsupportedScheme(url.scheme().to_string())),
        }
    }

    async fn request_http(
        &self,
        url: &Url,
        mode: RequestMode,
        options: FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        let client = if options.follow_redirects {
            &self.following
        } else {
            &self.non_following
        };

        let mut request = match mode {
            RequestMode::Probe => client.head(url.clone()),
            RequestMode::Full => client.get(url.clone()),
        };
        if options.accept_compressed {
            request = request.header(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        }

        let response = request.send().await?;
        tracing::trace!("{} {} -> {}", mode_name(mode), url, response.status());

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = match mode {
            RequestMode::Probe => Body::Empty,
            RequestMode::Full => Body::Http(response),
        };

        Ok(FetchResponse {
            status,
            headers,
            final_url,
            body,
        })
    }
}

/// Serves a `file:` target with a synthesized 200 status and no headers
async fn request_file(url: &Url, mode: RequestMode) -> Result<FetchResponse, FetchError> {
    let path = url
        .to_file_path()
        .map_err(|_| FetchError::InvalidPath(url.to_string()))?;
    let display = path.display().to_string();
    let io_error = |source: std::io::Error| FetchError::Io {
        path: display.clone(),
        source,
    };

    let body = match mode {
        RequestMode::Probe => {
            tokio::fs::metadata(&path).await.map_err(io_error)?;
            Body::Empty
        }
        RequestMode::Full => Body::File {
            file: tokio::fs::File::open(&path).await.map_err(io_error)?,
            path: display.clone(),
        },
    };

    Ok(FetchResponse {
        status: StatusCode::OK,
        headers: HeaderMap::new(),
        final_url: url.clone(),
        body,
    })
}

/// Builds an HTTP client
///
/// Every request carries `Cache-Control: no-cache` and `Pragma: no-cache` so
/// intermediaries cannot answer in place of the origin. Transparent
/// decompression is off so Content-Encoding stays observable.
pub fn build_http_client(config: &HttpConfig, follow_redirects: bool) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let redirect = if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)))
        .redirect(redirect)
        .gzip(false)
        .brotli(false);

    if !config.user_agent.is_empty() {
        builder = builder.user_agent(config.user_agent.clone());
    }

    builder.build()
}

/// Decodes a body according to its Content-Encoding header
///
/// `gzip` and `deflate` (zlib-wrapped or raw) are decoded; anything else is
/// returned untouched.
pub fn decode_content(bytes: Vec<u8>, headers: &HeaderMap) -> Result<Vec<u8>, FetchError> {
    let encoding = match headers.get(CONTENT_ENCODING).and_then(|v| v.to_str().ok()) {
        Some(value) => value.trim().to_ascii_lowercase(),
        None => return Ok(bytes),
    };

    let mut decoded = Vec::new();
    let result = match encoding.as_str() {
        "gzip" | "x-gzip" => GzDecoder::new(&bytes[..]).read_to_end(&mut decoded),
        "deflate" => match ZlibDecoder::new(&bytes[..]).read_to_end(&mut decoded) {
            Ok(n) => Ok(n),
            Err(_) => {
                decoded.clear();
                DeflateDecoder::new(&bytes[..]).read_to_end(&mut decoded)
            }
        },
        _ => return Ok(bytes),
    };

    result
        .map(|_| decoded)
        .map_err(|source| FetchError::Decode { encoding, source })
}

fn mode_name(mode: RequestMode) -> &'static str {
    match mode {
        RequestMode::Probe => "HEAD",
        RequestMode::Full => "GET",
    }
}
