// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed definition payload: {0}")]
    MalformedDefinition(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A response that did not have the shape we expected.
///
/// `path` points at the offending member, e.g. `notesInfo.result[0].fields.word`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct DecodeError {
    pub path: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Every way a fetch can end without producing a note.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("AnkiConnect request failed: {0}")]
    Transport(String),
    #[error("AnkiConnect rejected {action}: {message}")]
    Service {
        action: &'static str,
        message: String,
    },
    #[error("Unexpected {action} response: {source}")]
    Malformed {
        action: &'static str,
        #[source]
        source: DecodeError,
    },
    #[error("Search query matched no notes")]
    NoCandidates,
}
