// src/application/scroll.rs
use crate::application::session::SessionSnapshot;

/// Decides when the note list should jump to its end.
///
/// Fed every published snapshot. Requests a scroll when the last history element
/// changes identity (a note was appended) or when the last note's rubi was just
/// revealed.
#[derive(Debug, Default)]
pub struct ScrollFollower {
    last_marker: Option<(usize, String)>,
    last_revealed: bool,
}

impl ScrollFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the view should scroll to the end.
    pub fn observe(&mut self, snapshot: &SessionSnapshot) -> bool {
        let marker = snapshot
            .latest()
            .map(|note| (snapshot.history().len(), note.id.clone()));
        let revealed = snapshot
            .latest()
            .is_some_and(|note| snapshot.is_expanded(&note.id));

        let appended = marker != self.last_marker;
        let newly_revealed = !appended && revealed && !self.last_revealed;

        self.last_marker = marker;
        self.last_revealed = revealed;
        appended || newly_revealed
    }
}
