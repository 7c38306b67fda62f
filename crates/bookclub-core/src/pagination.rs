//! Stale-response guard and page cursors for list views.
//!
//! Each list view owns a `RequestTracker`. A fetch takes a ticket; when the
//! result arrives it is applied only if no newer fetch was started since.

use std::sync::atomic::{AtomicU64, Ordering};

/// Proof of which fetch a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, superseding any earlier ticket
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Hand `value` back only if it belongs to the latest fetch
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_latest(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, latest = self.latest.load(Ordering::SeqCst), "Dropping stale response");
            None
        }
    }
}

/// Page position of a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl PageCursor {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            pages: 0,
        }
    }

    /// Record how many pages the server reported
    pub fn update(&mut self, page: u32, pages: u32) {
        self.page = page.max(1);
        self.pages = pages;
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// The page to fetch next, if there is one
    pub fn next(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    pub fn prev(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    /// "Page 2 of 5", or "Page 1" before anything loaded
    pub fn label(&self) -> String {
        if self.pages > 0 {
            format!("Page {} of {}", self.page, self.pages)
        } else {
            format!("Page {}", self.page)
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(10)
    }
}
