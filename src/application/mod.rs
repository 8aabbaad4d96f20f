// src/application/mod.rs
pub mod fetch_dispatcher;
pub mod hotkeys;
pub mod note_fetcher;
pub mod protocol;
pub mod scroll;
pub mod session;

pub use fetch_dispatcher::FetchDispatcher;
pub use hotkeys::{Action, HotkeyDispatcher};
pub use note_fetcher::{AnkiConnect, FetchSettings, FieldNames, NoteFetcher, NoteSource};
pub use scroll::ScrollFollower;
pub use session::{SessionEvent, SessionSnapshot, SessionStore};
