// src/application/session.rs
use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{FetchError, Note};

/// Immutable view of the session at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    history: Vec<Arc<Note>>,
    expanded: BTreeSet<String>,
    last_error: Option<String>,
    revision: u64,
}

impl SessionSnapshot {
    /// Notes in the order they were appended.
    pub fn history(&self) -> &[Arc<Note>] {
        &self.history
    }

    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, note_id: &str) -> bool {
        self.expanded.contains(note_id)
    }

    /// The most recently appended note.
    pub fn latest(&self) -> Option<&Arc<Note>> {
        self.history.last()
    }

    /// Message of the last failed fetch, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    /// A fetch finished, successfully or not.
    Fetched(Result<Note, FetchError>),
    ToggleVisibility(String),
    ToggleLatest,
}

/// Owner of the session state.
///
/// Every accepted event produces a new snapshot which is published to subscribers.
/// Events that change nothing (toggling the latest note of an empty history) publish
/// nothing.
pub struct SessionStore {
    current: Arc<SessionSnapshot>,
    publisher: watch::Sender<Arc<SessionSnapshot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let current = Arc::new(SessionSnapshot::default());
        let (publisher, _) = watch::channel(Arc::clone(&current));
        Self { current, publisher }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.publisher.subscribe()
    }

    /// Apply an event; returns whether the state changed.
    pub fn dispatch(&mut self, event: SessionEvent) -> bool {
        let Some(next) = reduce(&self.current, event) else {
            return false;
        };
        self.current = Arc::new(next);
        self.publisher.send_replace(Arc::clone(&self.current));
        true
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn reduce(state: &SessionSnapshot, event: SessionEvent) -> Option<SessionSnapshot> {
    let mut next = state.clone();
    match event {
        SessionEvent::Fetched(Ok(note)) => {
            debug!(note_id = %note.id, word = %note.word, "Appending note");
            next.history.push(Arc::new(note));
            next.last_error = None;
        }
        SessionEvent::Fetched(Err(err)) => {
            warn!(error = %err, "Fetch produced no note");
            next.last_error = Some(err.to_string());
        }
        SessionEvent::ToggleVisibility(note_id) => toggle(&mut next.expanded, note_id),
        SessionEvent::ToggleLatest => {
            let note_id = state.latest()?.id.clone();
            toggle(&mut next.expanded, note_id);
        }
    }
    next.revision += 1;
    Some(next)
}

fn toggle(expanded: &mut BTreeSet<String>, note_id: String) {
    if !expanded.remove(&note_id) {
        expanded.insert(note_id);
    }
}
