//! Interactive terminal view
//!
//! Owns the session store and the UI loop:
//! - terminal setup/teardown (raw mode, alternate screen, mouse capture)
//! - keyboard and mouse input routed through the hotkey dispatcher
//! - fetch outcomes drained from the dispatcher's channel into the store
//! - rendering of the latest published snapshot

use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseButton,
    MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::application::hotkeys::{Focus, Key, KeyInput, KeyPhase};
use crate::application::{
    Action, AnkiConnect, FetchDispatcher, HotkeyDispatcher, NoteFetcher, NoteSource,
    ScrollFollower, SessionEvent, SessionSnapshot, SessionStore,
};
use crate::constants::UI_TICK_MS;
use crate::domain::{Note, SenseGroup};
use crate::infrastructure::config::TagStyle;
use crate::util::text::to_plain_text;

type Tui = Terminal<CrosstermBackend<Stdout>>;

const BUTTON_LABEL: &str = "Random Word";
const BUTTON_WIDTH: u16 = 19;
const QUERY_PROMPT: &str = "query> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Note(String),
    FetchButton,
}

/// Screen regions from the last draw, used to resolve mouse clicks.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub notes_area: Rect,
    pub scroll: usize,
    /// Content line range of each note card, with the note id.
    pub cards: Vec<(Range<usize>, String)>,
    pub button: Rect,
}

impl HitMap {
    pub fn target_at(&self, column: u16, row: u16) -> Option<ClickTarget> {
        if contains(self.button, column, row) {
            return Some(ClickTarget::FetchButton);
        }
        if !contains(self.notes_area, column, row) {
            return None;
        }
        let line = usize::from(row - self.notes_area.y) + self.scroll;
        self.cards
            .iter()
            .find(|(range, _)| range.contains(&line))
            .map(|(_, id)| ClickTarget::Note(id.clone()))
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Submit(String),
    Cancel,
}

/// Apply one key to the query editor buffer.
pub fn apply_edit(buffer: &mut String, code: KeyCode) -> EditOutcome {
    match code {
        KeyCode::Enter => EditOutcome::Submit(buffer.trim().to_string()),
        KeyCode::Esc => EditOutcome::Cancel,
        KeyCode::Backspace => {
            buffer.pop();
            EditOutcome::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            EditOutcome::Continue
        }
        _ => EditOutcome::Continue,
    }
}

/// Translate a crossterm key event for the hotkey dispatcher.
pub fn key_input(key: &KeyEvent, focus: Focus) -> KeyInput {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    };
    let phase = match key.kind {
        KeyEventKind::Press => KeyPhase::Press,
        KeyEventKind::Repeat => KeyPhase::Repeat,
        KeyEventKind::Release => KeyPhase::Release,
    };
    KeyInput {
        key: code,
        phase,
        command: key
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
        focus,
    }
}

pub struct TerminalView<C: AnkiConnect + 'static> {
    fetcher: Arc<NoteFetcher<C>>,
    dispatcher: FetchDispatcher,
    outcomes: mpsc::UnboundedReceiver<SessionEvent>,
    store: SessionStore,
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    snapshot: Arc<SessionSnapshot>,
    follower: ScrollFollower,
    hotkeys: HotkeyDispatcher,
    tags: BTreeMap<String, TagStyle>,
    scroll: usize,
    follow_pending: bool,
    editor: Option<String>,
    hits: HitMap,
    should_quit: bool,
}

impl<C: AnkiConnect + 'static> TerminalView<C> {
    pub fn new(fetcher: Arc<NoteFetcher<C>>, tags: BTreeMap<String, TagStyle>) -> Self {
        let (events, outcomes) = mpsc::unbounded_channel();
        let source: Arc<dyn NoteSource> = fetcher.clone();
        let store = SessionStore::new();
        let snapshots = store.subscribe();
        let snapshot = store.snapshot();

        Self {
            fetcher,
            dispatcher: FetchDispatcher::new(source, events),
            outcomes,
            store,
            snapshots,
            snapshot,
            follower: ScrollFollower::new(),
            hotkeys: HotkeyDispatcher::new(false),
            tags,
            scroll: 0,
            follow_pending: false,
            editor: None,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    /// Take over the terminal until the user quits.
    pub async fn run(mut self) -> Result<()> {
        let (mut terminal, release_events) = enter_terminal()?;
        self.hotkeys = HotkeyDispatcher::new(release_events);
        info!(release_events, "Terminal view started");

        let result = self.event_loop(&mut terminal).await;
        leave_terminal(&mut terminal, release_events)?;

        info!(notes = self.snapshot.history().len(), "Terminal view closed");
        result
    }

    async fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let tick = Duration::from_millis(UI_TICK_MS);

        while !self.should_quit {
            while let Ok(event) = self.outcomes.try_recv() {
                self.store.dispatch(event);
            }
            self.refresh_snapshot();

            terminal
                .draw(|frame| self.render(frame))
                .context("Failed to draw terminal view")?;

            if event::poll(tick).context("Failed to poll terminal events")? {
                match event::read().context("Failed to read terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    // A release may have been delivered elsewhere
                    Event::FocusLost | Event::FocusGained => self.hotkeys.reset(),
                    _ => {}
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn refresh_snapshot(&mut self) {
        if !self.snapshots.has_changed().unwrap_or(false) {
            return;
        }
        let snapshot = self.snapshots.borrow_and_update().clone();
        if self.follower.observe(&snapshot) {
            self.follow_pending = true;
        }
        self.snapshot = snapshot;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Release
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        if let Some(buffer) = self.editor.as_mut() {
            // Still fed to the dispatcher so a fetch-key release re-arms it.
            self.hotkeys.handle(key_input(&key, Focus::TextInput));
            if key.kind == KeyEventKind::Release {
                return;
            }
            match apply_edit(buffer, key.code) {
                EditOutcome::Continue => {}
                EditOutcome::Submit(query) => {
                    if !query.is_empty() {
                        self.fetcher.set_query(query);
                    }
                    self.editor = None;
                }
                EditOutcome::Cancel => self.editor = None,
            }
            return;
        }

        if let Some(action) = self.hotkeys.handle(key_input(&key, Focus::Body)) {
            self.perform(action);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.hits.target_at(mouse.column, mouse.row) {
                    Some(ClickTarget::Note(note_id)) => {
                        self.store.dispatch(SessionEvent::ToggleVisibility(note_id));
                    }
                    Some(ClickTarget::FetchButton) => self.perform(Action::FetchNext),
                    None => {}
                }
            }
            MouseEventKind::ScrollUp => self.perform(Action::ScrollUp),
            MouseEventKind::ScrollDown => self.perform(Action::ScrollDown),
            _ => {}
        }
    }

    fn perform(&mut self, action: Action) {
        debug!(?action, "Performing action");
        let page = usize::from(self.hits.notes_area.height.max(1));
        match action {
            Action::FetchNext => drop(self.dispatcher.request_fetch()),
            Action::ToggleLatest => {
                self.store.dispatch(SessionEvent::ToggleLatest);
            }
            Action::EditQuery => self.editor = Some(self.fetcher.query()),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(page),
            Action::PageDown => self.scroll = self.scroll.saturating_add(page),
            Action::Quit => self.should_quit = true,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let snapshot = Arc::clone(&self.snapshot);
        let area = frame.area();

        let definitions = definition_lines(snapshot.latest().map(|note| &**note), &self.tags);
        let detail_height = u16::try_from(definitions.len())
            .unwrap_or(u16::MAX)
            .saturating_add(5)
            .clamp(6, (area.height / 2).max(6));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),                // Note list
                Constraint::Length(detail_height), // Definitions + button
                Constraint::Length(1),             // Status line
            ])
            .split(area);

        let cards = self.render_notes(frame, &snapshot, chunks[0]);
        let button = render_detail(frame, definitions, chunks[1]);
        self.render_status(frame, &snapshot, chunks[2]);

        self.hits = HitMap {
            notes_area: chunks[0],
            scroll: self.scroll,
            cards,
            button,
        };
    }

    fn render_notes(
        &mut self,
        frame: &mut Frame,
        snapshot: &SessionSnapshot,
        area: Rect,
    ) -> Vec<(Range<usize>, String)> {
        if snapshot.history().is_empty() {
            self.scroll = 0;
            return Vec::new();
        }

        let (lines, cards) = note_list_lines(snapshot);
        let max_scroll = lines.len().saturating_sub(usize::from(area.height));
        if self.follow_pending {
            self.scroll = max_scroll;
            self.follow_pending = false;
        }
        self.scroll = self.scroll.min(max_scroll);

        let offset = u16::try_from(self.scroll).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
        cards
    }

    fn render_status(&self, frame: &mut Frame, snapshot: &SessionSnapshot, area: Rect) {
        if let Some(buffer) = &self.editor {
            let line = Line::from(vec![
                Span::styled(QUERY_PROMPT, Style::default().fg(Color::Cyan)),
                Span::raw(buffer.clone()),
            ]);
            let cursor_x = area
                .x
                .saturating_add(u16::try_from(line.width()).unwrap_or(u16::MAX));
            frame.render_widget(Paragraph::new(line), area);
            frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
            return;
        }

        let mut spans = vec![Span::styled(
            format!(
                " {} notes · {} fetching · space next · r rubi · / query · q quit ",
                snapshot.history().len(),
                self.dispatcher.in_flight()
            ),
            Style::default().fg(Color::DarkGray),
        )];
        if let Some(error) = snapshot.last_error() {
            spans.push(Span::styled(
                format!(" {error}"),
                Style::default().fg(Color::Red),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Lines of the note list plus the content line range of every card.
pub fn note_list_lines(
    snapshot: &SessionSnapshot,
) -> (Vec<Line<'static>>, Vec<(Range<usize>, String)>) {
    let mut lines = vec![Line::default()];
    let mut cards = Vec::with_capacity(snapshot.history().len());

    for note in snapshot.history() {
        let start = lines.len();
        lines.push(
            Line::from(Span::styled(
                to_plain_text(&note.word),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .centered(),
        );
        if snapshot.is_expanded(&note.id) {
            lines.push(
                Line::from(Span::styled(
                    to_plain_text(&note.rubi),
                    Style::default().fg(Color::DarkGray),
                ))
                .centered(),
            );
        }
        cards.push((start..lines.len(), note.id.clone()));
        lines.push(Line::default());
    }

    (lines, cards)
}

/// Definition lines for the most recent note.
///
/// A payload that fails to decode yields a single error line for that note.
pub fn definition_lines(
    note: Option<&Note>,
    tags: &BTreeMap<String, TagStyle>,
) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let Some(note) = note else {
        return vec![Line::from(Span::styled(
            "Press space or click Random Word to fetch a note",
            dim,
        ))
        .centered()];
    };

    match note.sense_groups() {
        Ok(groups) if groups.is_empty() => {
            vec![Line::from(Span::styled("No definitions", dim)).centered()]
        }
        Ok(groups) => groups
            .iter()
            .map(|group| sense_group_line(group, tags))
            .collect(),
        Err(err) => {
            debug!(note_id = %note.id, error = %err, "Cannot render definition");
            vec![Line::from(Span::styled(
                format!("Definition unavailable: {err}"),
                Style::default().fg(Color::Red),
            ))
            .centered()]
        }
    }
}

fn sense_group_line(group: &SenseGroup, tags: &BTreeMap<String, TagStyle>) -> Line<'static> {
    let mut spans = Vec::with_capacity(group.tags.len() * 2 + 1);
    for code in &group.tags {
        let (label, color) = match tags.get(code) {
            Some(style) => (style.label.clone(), parse_color(&style.color)),
            None => (code.clone(), Color::Gray),
        };
        spans.push(Span::styled(format!("[{label}]"), Style::default().fg(color)));
        spans.push(Span::raw(" "));
    }

    let text = group
        .definitions
        .iter()
        .map(|d| to_plain_text(d))
        .collect::<Vec<_>>()
        .join("; ");
    spans.push(Span::raw(text));
    Line::from(spans).centered()
}

/// Colour by name (`"cyan"`, `"lightblue"`) or hex (`"#ff8800"`); unknown names are gray.
pub fn parse_color(name: &str) -> Color {
    Color::from_str(name).unwrap_or(Color::Gray)
}

fn render_detail(frame: &mut Frame, definitions: Vec<Line<'static>>, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(definitions).wrap(Wrap { trim: true }),
        rows[0],
    );

    let button = centered(rows[1], BUTTON_WIDTH);
    frame.render_widget(
        Paragraph::new(Line::from(BUTTON_LABEL).centered()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        button,
    );
    button
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn enter_terminal() -> Result<(Tui, bool)> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    if let Err(err) = execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    ) {
        let _ = disable_raw_mode();
        return Err(err).context("Failed to enter alternate screen");
    }

    let release_events = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();

    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok((terminal, release_events)),
        Err(err) => {
            let mut stdout = io::stdout();
            if release_events {
                let _ = execute!(stdout, PopKeyboardEnhancementFlags);
            }
            let _ = execute!(
                stdout,
                DisableFocusChange,
                DisableMouseCapture,
                LeaveAlternateScreen
            );
            let _ = disable_raw_mode();
            Err(err).context("Failed to create terminal")
        }
    }
}

fn leave_terminal(terminal: &mut Tui, release_events: bool) -> Result<()> {
    if release_events {
        let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
