// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::protocol::ConnectRequest;
use crate::application::AnkiConnect;
use crate::domain::{FetchError, Note};

#[derive(Clone)]
enum Reply {
    Body(Value),
    TransportFailure(String),
}

/// Shared in-memory AnkiConnect for testing code that depends on [`AnkiConnect`]
///
/// Replies are configured per action and served for every matching request. All
/// requests are recorded so tests can assert on what was (and was not) sent.
///
/// # Examples
///
/// ```
/// use ankirubi::util::testing::{notes_info_response, MockAnkiConnect};
/// use serde_json::json;
///
/// let mock = MockAnkiConnect::builder()
///     .with_response("findNotes", json!({ "result": [42], "error": null }))
///     .with_response("notesInfo", notes_info_response(42, "話す", "はなす", "[]"))
///     .build();
/// assert_eq!(mock.count("findNotes"), 0);
/// ```
pub struct MockAnkiConnect {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<ConnectRequest>>,
}

impl MockAnkiConnect {
    pub fn builder() -> MockAnkiConnectBuilder {
        MockAnkiConnectBuilder::new()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ConnectRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `action`.
    pub fn count(&self, action: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.action == action)
            .count()
    }
}

#[async_trait]
impl AnkiConnect for MockAnkiConnect {
    async fn invoke(&self, request: &ConnectRequest) -> Result<Value, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match self.replies.get(request.action) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::TransportFailure(message)) => Err(FetchError::Transport(message.clone())),
            None => Err(FetchError::Transport(format!(
                "no reply configured for {}",
                request.action
            ))),
        }
    }
}

/// Builder for MockAnkiConnect
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockAnkiConnectBuilder {
    replies: HashMap<String, Reply>,
}

impl MockAnkiConnectBuilder {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
        }
    }

    /// Answer every `action` request with `body`
    pub fn with_response(mut self, action: &str, body: Value) -> Self {
        self.replies.insert(action.to_string(), Reply::Body(body));
        self
    }

    /// Fail every `action` request as if the connection broke
    pub fn with_transport_failure(mut self, action: &str, message: &str) -> Self {
        self.replies.insert(
            action.to_string(),
            Reply::TransportFailure(message.to_string()),
        );
        self
    }

    pub fn build(self) -> MockAnkiConnect {
        MockAnkiConnect {
            replies: self.replies,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockAnkiConnectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A well-formed `notesInfo` body for a note with the default field names.
pub fn notes_info_response(note_id: i64, word: &str, rubi: &str, def: &str) -> Value {
    json!({
        "result": [{
            "noteId": note_id,
            "modelName": "VocabJP",
            "tags": [],
            "fields": {
                "word": { "value": word, "order": 0 },
                "rubi": { "value": rubi, "order": 1 },
                "def": { "value": def, "order": 2 }
            }
        }],
        "error": null
    })
}

pub fn sample_note(id: &str) -> Note {
    Note {
        id: id.to_string(),
        word: format!("word-{id}"),
        rubi: format!("rubi-{id}"),
        def: r#"[[["n"],["sample"]]]"#.to_string(),
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "mio", "wiremock"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
