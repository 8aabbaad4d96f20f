// src/application/hotkeys.rs
//
// Terminal-independent hotkey routing. The view translates its key events into
// `KeyInput` and acts on the returned `Action`.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FetchNext,
    ToggleLatest,
    EditQuery,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    PageUp,
    PageDown,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Press,
    Repeat,
    Release,
}

/// Where keyboard focus currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Body,
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub phase: KeyPhase,
    /// Platform command modifier (Super/Meta) held.
    pub command: bool,
    pub focus: Focus,
}

impl KeyInput {
    pub fn press(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Press,
            command: false,
            focus: Focus::Body,
        }
    }

    pub fn with_phase(self, phase: KeyPhase) -> Self {
        Self { phase, ..self }
    }
}

pub const FETCH_KEY: char = ' ';
pub const TOGGLE_KEY: char = 'r';
pub const EDIT_QUERY_KEY: char = '/';
pub const QUIT_KEY: char = 'q';

/// Without release events, fetch-key presses closer together than this belong to
/// one hold. Longer than common autorepeat delays.
pub const REPEAT_GAP: Duration = Duration::from_millis(600);

/// Maps key input to actions.
///
/// The fetch key fires once per physical hold: after it fires, further presses and
/// repeats are ignored until the hold ends. With `release_events` the hold ends on
/// the key's release. Terminals that never report releases deliver autorepeat as
/// plain presses, so there the hold ends once no fetch-key event has arrived for
/// [`REPEAT_GAP`].
#[derive(Debug)]
pub struct HotkeyDispatcher {
    release_events: bool,
    fetch_key_held: bool,
    last_fetch_key: Option<Instant>,
}

impl HotkeyDispatcher {
    pub fn new(release_events: bool) -> Self {
        Self {
            release_events,
            fetch_key_held: false,
            last_fetch_key: None,
        }
    }

    /// Forget any hold in progress, e.g. when focus moved away and a release may
    /// have been missed.
    pub fn reset(&mut self) {
        self.fetch_key_held = false;
        self.last_fetch_key = None;
    }

    pub fn handle(&mut self, input: KeyInput) -> Option<Action> {
        self.handle_at(input, Instant::now())
    }

    pub fn handle_at(&mut self, input: KeyInput, now: Instant) -> Option<Action> {
        if input.key == Key::Char(FETCH_KEY) {
            if input.phase == KeyPhase::Release {
                self.reset();
                return None;
            }
            if !self.release_events {
                let within_hold = self
                    .last_fetch_key
                    .is_some_and(|last| now.saturating_duration_since(last) < REPEAT_GAP);
                if !within_hold {
                    self.fetch_key_held = false;
                }
                self.last_fetch_key = Some(now);
            }
        }
        if input.command || input.focus == Focus::TextInput {
            return None;
        }

        match (input.key, input.phase) {
            (_, KeyPhase::Release) => None,
            (Key::Char(FETCH_KEY), KeyPhase::Repeat) => None,
            (Key::Char(FETCH_KEY), KeyPhase::Press) => {
                if self.fetch_key_held {
                    return None;
                }
                self.fetch_key_held = true;
                Some(Action::FetchNext)
            }
            (Key::Char(TOGGLE_KEY), KeyPhase::Press) => Some(Action::ToggleLatest),
            (Key::Char(EDIT_QUERY_KEY), KeyPhase::Press) => Some(Action::EditQuery),
            (Key::Char(QUIT_KEY) | Key::Esc, KeyPhase::Press) => Some(Action::Quit),
            (Key::Up, _) => Some(Action::ScrollUp),
            (Key::Down, _) => Some(Action::ScrollDown),
            (Key::PageUp, _) => Some(Action::PageUp),
            (Key::PageDown, _) => Some(Action::PageDown),
            _ => None,
        }
    }
}
