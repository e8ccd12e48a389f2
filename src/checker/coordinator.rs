//! Verification coordinator - the main checking loop
//!
//! This module drains the worklist one item at a time:
//! - Page checks fetch a page, run the page-level checks and schedule the
//!   page's links ahead of the remaining pages
//! - Link checks enforce the link policies, deduplicate targets and walk the
//!   probe/full-request state machine
//! - Once the worklist is empty the collected issues are reported

use crate::checker::fetcher::{decode_content, FetchOptions, FetchResponse, Fetcher};
use crate::checker::headers::{check_caching, check_compression};
use crate::checker::parser::extract_links;
use crate::checker::scheduler::{LinkCheck, PageCheck, WorkItem, Worklist};
use crate::checker::xhtml::validate_xhtml;
use crate::config::{validate, Config};
use crate::integrity::ExpectedHash;
use crate::output::{format_count, format_summary, Issue, IssueCollector, ReportSink};
use crate::state::{LinkState, RequestMode};
use crate::url::{dedup_key, is_local_host, normalize_page, resolve_link};
use crate::CheckError;
use reqwest::header::LOCATION;
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Marker used when a disallowed redirect carries no Location header
pub const MISSING_LOCATION: &str = "[Missing Location header]";

/// Outcome of a run
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Every issue, in detection order
    pub issues: Vec<Issue>,
}

impl VerifyReport {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// A run succeeds when it recorded no issues
    pub fn is_success(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run-scoped state shared by every check
struct RunContext<'a> {
    sink: &'a dyn ReportSink,
    issues: IssueCollector,
    /// Fragment-stripped targets already claimed for testing
    visited: HashSet<String>,
    summary: bool,
}

impl RunContext<'_> {
    fn info(&self, line: &str) {
        self.sink.info(line);
    }

    fn issue(&mut self, page: &str, message: String) {
        if self.summary {
            self.sink.info(&message);
        } else {
            self.sink.error(&message);
        }
        self.issues.record(page, message);
    }

    /// Claims a target; false if it was tested before
    fn claim(&mut self, target: &Url) -> bool {
        self.visited.insert(dedup_key(target))
    }
}

/// Main verification coordinator
pub struct Coordinator<'a> {
    config: Config,
    fetcher: Fetcher,
    worklist: Worklist,
    context: RunContext<'a>,
}

impl<'a> Coordinator<'a> {
    /// Validates the configuration and prepares a run
    ///
    /// Nothing is fetched until [`Coordinator::run`] is called.
    pub fn new(config: Config, sink: &'a dyn ReportSink) -> Result<Self, CheckError> {
        validate(&config)?;

        let pages = config
            .pages
            .iter()
            .map(|page| normalize_page(page))
            .collect::<Result<Vec<_>, _>>()?;
        let fetcher = Fetcher::new(&config.http)?;
        let summary = config.report.summary;

        Ok(Self {
            config,
            fetcher,
            worklist: Worklist::from_pages(pages),
            context: RunContext {
                sink,
                issues: IssueCollector::new(),
                visited: HashSet::new(),
                summary,
            },
        })
    }

    /// Processes the worklist to completion and reports the result
    pub async fn run(mut self) -> VerifyReport {
        tracing::debug!("Starting verification of {} pages", self.worklist.len());

        while let Some(item) = self.worklist.next_item() {
            match item {
                WorkItem::Page(page) => self.check_page(page).await,
                WorkItem::Link(link) => self.check_link(link).await,
            }
        }

        self.finish()
    }

    fn finish(self) -> VerifyReport {
        let RunContext { sink, issues, .. } = self.context;
        let issues = issues.into_issues();

        if !issues.is_empty() {
            if self.config.report.summary {
                sink.error(&format_summary(&issues));
            }
            sink.error(&format_count(issues.len()));
        }

        tracing::debug!("Verification complete with {} issues", issues.len());
        VerifyReport { issues }
    }

    /// Fetches one page and runs the enabled page-level checks
    async fn check_page(&mut self, mut page: PageCheck) {
        let requested = page.target.to_string();
        let options = FetchOptions {
            follow_redirects: true,
            accept_compressed: self.config.checks.compression,
        };
        let start = Instant::now();

        let response = match self.fetcher.fetch(&page.target, options).await {
            Ok(response) => response,
            Err(e) => {
                let message = format!(
                    "Page error ({}): {} ({}ms)",
                    e,
                    requested,
                    start.elapsed().as_millis()
                );
                self.context.issue(&requested, message);
                return;
            }
        };

        if !response.is_success() {
            let message = format!(
                "Bad page ({}): {} ({}ms)",
                response.status.as_u16(),
                requested,
                start.elapsed().as_millis()
            );
            self.context.issue(&requested, message);
            return;
        }

        let FetchResponse {
            headers,
            final_url,
            body,
            ..
        } = response;

        let raw = match body.read_all().await {
            Ok(raw) => raw,
            Err(e) => {
                let message = format!(
                    "Page error ({}): {} ({}ms)",
                    e,
                    requested,
                    start.elapsed().as_millis()
                );
                self.context.issue(&requested, message);
                return;
            }
        };
        let elapsed = start.elapsed().as_millis();

        if dedup_key(&final_url) != dedup_key(&page.target) {
            self.context
                .info(&format!("Redirected page: {} -> {}", requested, final_url));
            page.target = final_url;
        }
        let page_name = page.target.to_string();
        self.context
            .info(&format!("Page: {} ({}ms)", page_name, elapsed));

        if self.config.checks.links || self.config.checks.xhtml {
            match decode_content(raw, &headers) {
                Ok(bytes) => {
                    let document = String::from_utf8_lossy(&bytes);
                    if self.config.checks.links {
                        self.schedule_links(&page.target, &page_name, &document);
                    }
                    if self.config.checks.xhtml {
                        for violation in validate_xhtml(&document) {
                            self.context.issue(&page_name, violation.message());
                        }
                    }
                }
                Err(e) => {
                    let message = format!("Page error ({}): {} ({}ms)", e, page_name, elapsed);
                    self.context.issue(&page_name, message);
                }
            }
        }

        if let Some(max) = self.config.checks.max_response_time {
            if elapsed > u128::from(max) {
                self.context.issue(
                    &page_name,
                    format!("Page response took more than {}ms to complete", max),
                );
            }
        }

        if self.config.checks.caching {
            for problem in check_caching(&headers) {
                self.context.issue(&page_name, problem);
            }
        }

        if self.config.checks.compression {
            if let Some(problem) = check_compression(&headers) {
                self.context.issue(&page_name, problem);
            }
        }
    }

    /// Resolves and filters a page's links, then queues them ahead of the
    /// remaining pages
    fn schedule_links(&mut self, page: &Url, page_name: &str, document: &str) {
        let policy = &self.config.links;
        let mut checks = Vec::new();

        for link in extract_links(document) {
            let Some(target) = resolve_link(page, &link.value) else {
                tracing::trace!("Skipping {}[{}]={}", link.element, link.attribute, link.value);
                continue;
            };

            if policy.only_same_domain && target.host_str() != page.host_str() {
                continue;
            }

            if policy
                .ignore
                .iter()
                .any(|ignored| *ignored == link.value || ignored.as_str() == target.as_str())
            {
                continue;
            }

            let expected_hash = if policy.query_hashes {
                ExpectedHash::from_url(&target)
            } else {
                None
            };
            checks.push(LinkCheck::new(target, page_name.to_string(), expected_hash));
        }

        tracing::debug!("Scheduling {} links from {}", checks.len(), page_name);
        self.worklist.schedule_links(checks);
    }

    /// Verifies one link
    async fn check_link(&mut self, link: LinkCheck) {
        let LinkCheck {
            target,
            page,
            expected_hash,
            mut state,
        } = link;
        let shown = target.to_string();
        let policy = &self.config.links;

        if policy.no_empty_fragments && target.fragment() == Some("") {
            self.context.issue(&page, format!("Empty fragment: {}", shown));
        }

        if !self.context.claim(&target) {
            self.context.info(&format!("Visited link: {}", shown));
            return;
        }

        if policy.no_local_links && is_local_host(&target) {
            self.context.issue(&page, format!("Local link: {}", shown));
        }

        if policy.prefer_secure && target.scheme() == "http" {
            self.context.issue(&page, format!("Insecure link: {}", shown));
        }

        let no_redirects = policy.no_redirects;
        let options = FetchOptions {
            follow_redirects: !no_redirects,
            accept_compressed: false,
        };
        let start = Instant::now();

        while let Some(mode) = state.request_mode() {
            let result = match mode {
                RequestMode::Probe => self.fetcher.probe(&target, options).await,
                RequestMode::Full => self.fetcher.fetch(&target, options).await,
            };
            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    let message = format!(
                        "Link error ({}): {} ({}ms)",
                        e,
                        shown,
                        start.elapsed().as_millis()
                    );
                    self.context.issue(&page, message);
                    return;
                }
            };

            state = state.after_response(response.is_success());
            match state {
                LinkState::Pass => {
                    if let Some(expected) = &expected_hash {
                        if !self.verify_hash(&page, &shown, expected, response, start).await {
                            return;
                        }
                    }
                    self.context.info(&format!(
                        "Link: {} ({}ms)",
                        shown,
                        start.elapsed().as_millis()
                    ));
                }
                LinkState::Fail => {
                    let status = response.status.as_u16();
                    let message = if no_redirects && response.status.is_redirection() {
                        format!(
                            "Redirected link ({}: {}): {} ({}ms)",
                            status,
                            response.header(LOCATION.as_str()).unwrap_or(MISSING_LOCATION),
                            shown,
                            start.elapsed().as_millis()
                        )
                    } else {
                        format!(
                            "Bad link ({}): {} ({}ms)",
                            status,
                            shown,
                            start.elapsed().as_millis()
                        )
                    };
                    self.context.issue(&page, message);
                }
                LinkState::Probe | LinkState::RetryAsFull => {
                    tracing::debug!(
                        "Probe of {} returned {}, retrying with a full request",
                        shown,
                        response.status
                    );
                }
            }
        }
    }

    /// Hashes a full response body and compares it with the expected digest
    ///
    /// Returns false if the body could not be read (already recorded).
    async fn verify_hash(
        &mut self,
        page: &str,
        shown: &str,
        expected: &ExpectedHash,
        response: FetchResponse,
        start: Instant,
    ) -> bool {
        let mut digest = expected.hasher();

        if let Err(e) = response.body.drain_into(|chunk| digest.update(chunk)).await {
            let message = format!(
                "Link error ({}): {} ({}ms)",
                e,
                shown,
                start.elapsed().as_millis()
            );
            self.context.issue(page, message);
            return false;
        }

        let actual = digest.finalize_hex();
        if expected.matches(&actual) {
            self.context.info(&format!("Hash: {}", shown));
        } else {
            self.context
                .issue(page, format!("Hash error ({}): {}", actual, shown));
        }
        true
    }
}
