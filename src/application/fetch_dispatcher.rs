// src/application/fetch_dispatcher.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::note_fetcher::NoteSource;
use crate::application::session::SessionEvent;

/// Runs every fetch as its own task and forwards the outcome as a [`SessionEvent`].
///
/// Fetches are neither coalesced nor cancelled. Outcomes are delivered in completion
/// order, so two overlapping fetches land in the session in whichever order they
/// finish.
pub struct FetchDispatcher {
    source: Arc<dyn NoteSource>,
    events: mpsc::UnboundedSender<SessionEvent>,
    in_flight: Arc<AtomicUsize>,
}

impl FetchDispatcher {
    pub fn new(source: Arc<dyn NoteSource>, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            source,
            events,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start a fetch. Must be called from within a tokio runtime.
    pub fn request_fetch(&self) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let pending = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(pending, "Fetch requested");

        tokio::spawn(async move {
            let outcome = source.fetch_random_note().await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if events.send(SessionEvent::Fetched(outcome)).is_err() {
                debug!("Session closed before fetch completed");
            }
        })
    }

    /// Number of fetches started but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
