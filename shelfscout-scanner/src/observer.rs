//! Structured event emission for fetches, classification, and product records.
//!
//! An [`Observer`] is handed to the traversal engine, the HTTP fetcher and the
//! product collector. The engine behaves identically whichever observer is
//! installed; observers only watch.

use crate::sitemap::DocumentKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ScoutEvent {
    FetchAttempt {
        url: String,
        attempt: u32,
    },
    FetchBackoff {
        url: String,
        attempt: u32,
        delay: Duration,
        reason: String,
    },
    FetchSucceeded {
        url: String,
        status: u16,
        attempts: u32,
    },
    FetchFailed {
        url: String,
        error: String,
        attempts: u32,
    },
    SitemapClassified {
        url: String,
        kind: DocumentKind,
        product_sitemaps: usize,
        nested_sitemaps: usize,
        product_urls: usize,
    },
    ProductRecorded {
        product_url: String,
        ok: bool,
    },
}

pub trait Observer: Send + Sync {
    fn note(&self, _message: &str) {}

    fn event(&self, _event: &ScoutEvent) {}
}

pub type SharedObserver = Arc<dyn Observer>;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

pub fn noop() -> SharedObserver {
    Arc::new(NoopObserver)
}

/// In-memory record of everything observed during a run.
#[derive(Debug, Default)]
pub struct ConversationLog {
    notes: Mutex<Vec<String>>,
    events: Mutex<Vec<ScoutEvent>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn events(&self) -> Vec<ScoutEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events concerning a single URL, in emission order.
    pub fn events_for(&self, url: &str) -> Vec<ScoutEvent> {
        self.events()
            .into_iter()
            .filter(|event| event_url(event) == url)
            .collect()
    }
}

impl Observer for ConversationLog {
    fn note(&self, message: &str) {
        if let Ok(mut notes) = self.notes.lock() {
            notes.push(message.to_string());
        }
    }

    fn event(&self, event: &ScoutEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

fn event_url(event: &ScoutEvent) -> &str {
    match event {
        ScoutEvent::FetchAttempt { url, .. }
        | ScoutEvent::FetchBackoff { url, .. }
        | ScoutEvent::FetchSucceeded { url, .. }
        | ScoutEvent::FetchFailed { url, .. }
        | ScoutEvent::SitemapClassified { url, .. } => url,
        ScoutEvent::ProductRecorded { product_url, .. } => product_url,
    }
}
