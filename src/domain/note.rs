// src/domain/note.rs
use serde::Serialize;

use crate::domain::{parse_definition, DomainError, SenseGroup};

/// One vocabulary note as fetched from AnkiConnect.
///
/// `id` is the numeric AnkiConnect note id carried as text. `def` keeps the raw
/// definition payload; use [`Note::sense_groups`] to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: String,
    pub word: String,
    pub rubi: String,
    pub def: String,
}

impl Note {
    pub fn sense_groups(&self) -> Result<Vec<SenseGroup>, DomainError> {
        parse_definition(&self.def)
    }
}
