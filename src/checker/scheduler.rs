//! Worklist of pending page and link checks
//!
//! This module handles:
//! - FIFO ordering of page checks in caller order
//! - Front-insertion of a page's link checks, so every link of a page
//!   finishes before the next page is fetched
//! - Handing out exactly one item at a time to the consumer loop

use crate::integrity::ExpectedHash;
use crate::state::LinkState;
use std::collections::VecDeque;
use url::Url;

/// A page to fetch and check
#[derive(Debug, Clone)]
pub struct PageCheck {
    /// The page target; replaced by the final URL if the fetch redirects
    pub target: Url,
}

/// A link to verify on behalf of a page
#[derive(Debug, Clone)]
pub struct LinkCheck {
    /// The resolved link target
    pub target: Url,

    /// The owning page (after any redirect), for issue attribution
    pub page: String,

    /// Digest the body must match, when hash checking is on
    pub expected_hash: Option<ExpectedHash>,

    /// Where in the probe/retry state machine this check starts
    pub state: LinkState,
}

impl LinkCheck {
    pub fn new(target: Url, page: String, expected_hash: Option<ExpectedHash>) -> Self {
        let state = LinkState::initial(expected_hash.is_some());
        Self {
            target,
            page,
            expected_hash,
            state,
        }
    }
}

/// A unit of work
#[derive(Debug, Clone)]
pub enum WorkItem {
    Page(PageCheck),
    Link(LinkCheck),
}

/// Ordered worklist consumed by a single loop
#[derive(Debug, Default)]
pub struct Worklist {
    items: VecDeque<WorkItem>,
}

impl Worklist {
    /// Creates a worklist holding one page check per target, in order
    pub fn from_pages(pages: Vec<Url>) -> Self {
        Self {
            items: pages
                .into_iter()
                .map(|target| WorkItem::Page(PageCheck { target }))
                .collect(),
        }
    }

    /// Removes the next item to process
    pub fn next_item(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Inserts link checks ahead of everything still queued, keeping their order
    pub fn schedule_links(&mut self, links: Vec<LinkCheck>) {
        for link in links.into_iter().rev() {
            self.items.push_front(WorkItem::Link(link));
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
