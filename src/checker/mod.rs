//! Checker module for page and link verification
//!
//! This module contains the core verification pipeline, including:
//! - Fetching pages and resources over HTTP or from the local filesystem
//! - Link extraction and strict markup validation
//! - The worklist that orders page and link checks
//! - Overall run coordination and issue reporting

mod coordinator;
mod fetcher;
mod headers;
mod parser;
mod scheduler;
mod xhtml;

pub use coordinator::{Coordinator, VerifyReport, MISSING_LOCATION};
pub use fetcher::{
    build_http_client, decode_content, Body, FetchError, FetchOptions, FetchResponse, Fetcher,
    MAX_REDIRECTS,
};
pub use headers::{check_caching, check_compression, is_valid_cache_control, is_valid_etag};
pub use parser::{extract_links, ExtractedLink, TRACKED_ATTRIBUTES};
pub use scheduler::{LinkCheck, PageCheck, WorkItem, Worklist};
pub use xhtml::{validate_xhtml, MarkupViolation};

use crate::config::Config;
use crate::output::{ReportSink, TracingSink};
use crate::CheckError;

/// Runs a complete verification, reporting through `tracing`
///
/// This is the main entry point. It will:
/// 1. Validate the configuration (no I/O happens if this fails)
/// 2. Queue one page check per configured page
/// 3. Fetch each page and run the enabled page-level checks
/// 4. Verify each page's links before moving on to the next page
/// 5. Report the collected issues
///
/// # Returns
///
/// * `Ok(VerifyReport)` - The run completed; inspect the report for issues
/// * `Err(CheckError)` - The configuration was invalid or the HTTP client could not be built
pub async fn verify(config: Config) -> Result<VerifyReport, CheckError> {
    verify_with_sink(config, &TracingSink).await
}

/// Runs a complete verification, writing report lines to `sink`
pub async fn verify_with_sink(
    config: Config,
    sink: &dyn ReportSink,
) -> Result<VerifyReport, CheckError> {
    let coordinator = Coordinator::new(config, sink)?;
    Ok(coordinator.run().await)
}
