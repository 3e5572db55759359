//! Diagnostic publication with stale-result suppression
//!
//! Every diagnostic pass takes a [`Ticket`] before it suspends on settings.
//! Issuing a ticket supersedes all earlier tickets for the same uri, so a pass
//! that resumes after a newer change (or a close) finds its ticket outdated
//! and drops its result instead of publishing it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tower_lsp::lsp_types::{Diagnostic, Url};
use tracing::debug;

use crate::sync::lock;

/// Identifies one diagnostic pass over one document snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    uri: Url,
    version: i32,
    generation: u64,
}

impl Ticket {
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Last diagnostics sent for a uri
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedSet {
    pub version: i32,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct DiagnosticPublisher {
    next_generation: AtomicU64,
    latest: Mutex<HashMap<Url, u64>>,
    published: Mutex<HashMap<Url, PublishedSet>>,
    // Serializes check-then-send so two passes cannot reorder on the wire
    gate: tokio::sync::Mutex<()>,
}

impl DiagnosticPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a pass for `uri` at `version`, superseding earlier passes
    pub fn issue(&self, uri: &Url, version: i32) -> Ticket {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.latest).insert(uri.clone(), generation);

        Ticket {
            uri: uri.clone(),
            version,
            generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        lock(&self.latest).get(&ticket.uri) == Some(&ticket.generation)
    }

    /// Forgets a closed document; its outstanding tickets become stale
    pub fn forget(&self, uri: &Url) {
        lock(&self.latest).remove(uri);
        lock(&self.published).remove(uri);
    }

    pub fn published(&self, uri: &Url) -> Option<PublishedSet> {
        lock(&self.published).get(uri).copied()
    }

    /// Sends `diagnostics` through `send` if `ticket` is still the newest pass
    /// for its uri. The published set is replaced wholesale.
    ///
    /// Returns whether anything was sent.
    pub async fn publish<F, Fut>(
        &self,
        ticket: Ticket,
        diagnostics: Vec<Diagnostic>,
        send: F,
    ) -> bool
    where
        F: FnOnce(Url, Vec<Diagnostic>, i32) -> Fut,
        Fut: Future<Output = ()>,
    {
        let _gate = self.gate.lock().await;

        if !self.is_current(&ticket) {
            debug!(
                "Discarding superseded diagnostics for {} at version {}",
                ticket.uri, ticket.version
            );
            return false;
        }

        let newer_published = self
            .published(&ticket.uri)
            .is_some_and(|published| published.version > ticket.version);
        if newer_published {
            debug!(
                "Discarding diagnostics for {} at version {}: newer version already published",
                ticket.uri, ticket.version
            );
            return false;
        }

        let count = diagnostics.len();
        send(ticket.uri.clone(), diagnostics, ticket.version).await;

        if self.is_current(&ticket) {
            lock(&self.published).insert(
                ticket.uri,
                PublishedSet {
                    version: ticket.version,
                    count,
                },
            );
        }
        true
    }
}
