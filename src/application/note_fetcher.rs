// src/application/note_fetcher.rs
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::protocol::{
    decode_note_ids, decode_single_note_info, ConnectRequest, NOTES_INFO,
};
use crate::domain::{FetchError, Note};

/// Transport to an AnkiConnect endpoint: send one request, get the raw JSON body back.
#[async_trait]
pub trait AnkiConnect: Send + Sync {
    async fn invoke(&self, request: &ConnectRequest) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: AnkiConnect + ?Sized> AnkiConnect for Arc<T> {
    async fn invoke(&self, request: &ConnectRequest) -> Result<Value, FetchError> {
        (**self).invoke(request).await
    }
}

/// Anything that can produce a random note on demand.
#[async_trait]
pub trait NoteSource: Send + Sync {
    async fn fetch_random_note(&self) -> Result<Note, FetchError>;
}

/// Names of the note fields that hold the word, its reading and its definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub word: String,
    pub rubi: String,
    pub def: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            word: "word".to_string(),
            rubi: "rubi".to_string(),
            def: "def".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub query: String,
    pub version: u8,
    pub fields: FieldNames,
}

/// Two-step random note lookup: `findNotes` for candidates, then `notesInfo` for one
/// of them picked uniformly at random.
pub struct NoteFetcher<C> {
    connect: C,
    query: RwLock<String>,
    version: u8,
    fields: FieldNames,
    rng: Mutex<StdRng>,
}

impl<C: AnkiConnect> NoteFetcher<C> {
    pub fn new(connect: C, settings: FetchSettings) -> Self {
        Self::with_rng(connect, settings, StdRng::from_os_rng())
    }

    /// Use a caller-provided random source, e.g. a seeded one in tests.
    pub fn with_rng(connect: C, settings: FetchSettings, rng: StdRng) -> Self {
        Self {
            connect,
            query: RwLock::new(settings.query),
            version: settings.version,
            fields: settings.fields,
            rng: Mutex::new(rng),
        }
    }

    pub fn query(&self) -> String {
        self.query
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the search query used by subsequent fetches.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        info!(%query, "Search query changed");
        *self.query.write().unwrap_or_else(PoisonError::into_inner) = query;
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_random_note(&self) -> Result<Note, FetchError> {
        let candidates = self.find_candidates().await?;

        let picked = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            choose_candidate(&candidates, &mut *rng)
        };
        let note_id = picked.ok_or(FetchError::NoCandidates)?;
        debug!(note_id, candidates = candidates.len(), "Picked candidate");

        self.fetch_note(note_id).await
    }

    pub async fn find_candidates(&self) -> Result<Vec<i64>, FetchError> {
        let request = ConnectRequest::find_notes(&self.query(), self.version);
        let response = self.connect.invoke(&request).await?;
        decode_note_ids(response)
    }

    /// Load a single note by id and map the configured fields onto a [`Note`].
    pub async fn fetch_note(&self, note_id: i64) -> Result<Note, FetchError> {
        let request = ConnectRequest::notes_info(note_id, self.version);
        let response = self.connect.invoke(&request).await?;
        let info = decode_single_note_info(response)?;
        debug!(
            note_id = info.note_id,
            model = %info.model_name,
            tags = ?info.tags,
            "Received note info"
        );

        let field = |name: &str| {
            info.field(name)
                .map(str::to_string)
                .map_err(|source| FetchError::Malformed {
                    action: NOTES_INFO,
                    source,
                })
        };

        Ok(Note {
            id: note_id.to_string(),
            word: field(&self.fields.word)?,
            rubi: field(&self.fields.rubi)?,
            def: field(&self.fields.def)?,
        })
    }
}

#[async_trait]
impl<C: AnkiConnect> NoteSource for NoteFetcher<C> {
    async fn fetch_random_note(&self) -> Result<Note, FetchError> {
        NoteFetcher::fetch_random_note(self).await
    }
}

/// Pick one candidate uniformly by index; `None` when there is nothing to pick.
pub fn choose_candidate<R: Rng + ?Sized>(candidates: &[i64], rng: &mut R) -> Option<i64> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}
