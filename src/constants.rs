// src/constants.rs
//
// Application-wide constants. Each is documented with where it is used.

/// Host AnkiConnect listens on unless configured otherwise.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port AnkiConnect listens on unless configured otherwise.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_PORT: u16 = 8765;

/// AnkiConnect API version sent with every request.
///
/// Used in: `infrastructure/config.rs`
pub const ANKI_CONNECT_VERSION: u8 = 6;

/// Search query for candidate notes: verbs of the VocabJP deck that have been
/// reviewed at least once.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_QUERY: &str = "deck:VocabJP (v1 OR v1-s OR v5aru OR v5b OR v5g OR v5k OR v5k-s \
     OR v5m OR v5n OR v5r OR v5r-i OR v5s OR v5t OR v5u OR v5u-s) prop:ease>0";

/// Directory name under the user's config and cache directories.
///
/// Used in: `infrastructure/config.rs`, `lib.rs`
pub const APP_DIR_NAME: &str = "ankirubi";

/// Log file written while the interactive view owns the terminal.
///
/// Used in: `lib.rs`
pub const LOG_FILE_NAME: &str = "ankirubi.log";

/// How long the view waits for terminal input before redrawing.
///
/// Short enough that completed fetches show up without a key press.
///
/// Used in: `ports/tui.rs`
pub const UI_TICK_MS: u64 = 50;
