// src/domain/mod.rs
pub mod definition;
pub mod error;
pub mod note;

pub use definition::{parse_definition, SenseGroup};
pub use error::{DecodeError, DomainError, FetchError};
pub use note::Note;
