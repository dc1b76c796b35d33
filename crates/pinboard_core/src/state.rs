use std::fmt;
use std::path::PathBuf;

use crate::view_model::AppViewModel;

pub const DEFAULT_MAX_ITEMS: usize = 100;
const READY_STATUS: &str = "Ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Paused,
    /// Stop requested; waiting for the engine to unwind.
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    FastLimit,
    StrictBoardOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::FastLimit => write!(f, "fast limit"),
            Mode::StrictBoardOnly => write!(f, "strict board only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRow {
    pub source_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResultKind {
    Completed { saved: usize },
    NoImages,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    board_url: String,
    max_items: usize,
    destination: Option<PathBuf>,
    mode: Mode,
    session: SessionState,
    status: String,
    items: Vec<PinRow>,
    last_result: Option<RunResultKind>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            board_url: String::new(),
            max_items: DEFAULT_MAX_ITEMS,
            destination: None,
            mode: Mode::default(),
            session: SessionState::default(),
            status: READY_STATUS.to_string(),
            items: Vec::new(),
            last_result: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            board_url: self.board_url.clone(),
            max_items: self.max_items,
            destination: self.destination.clone(),
            mode: self.mode,
            status: self.status.clone(),
            items: self.items.clone(),
            last_result: self.last_result.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub(crate) fn board_url(&self) -> &str {
        &self.board_url
    }

    pub(crate) fn max_items(&self) -> usize {
        self.max_items
    }

    pub(crate) fn destination(&self) -> Option<&PathBuf> {
        self.destination.as_ref()
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn set_board_url(&mut self, url: String) {
        if self.board_url != url {
            self.board_url = url;
            self.dirty = true;
        }
    }

    pub(crate) fn set_max_items(&mut self, max_items: usize) {
        if self.max_items != max_items {
            self.max_items = max_items;
            self.dirty = true;
        }
    }

    pub(crate) fn set_destination(&mut self, destination: PathBuf) {
        if self.destination.as_ref() != Some(&destination) {
            self.destination = Some(destination);
            self.dirty = true;
        }
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.dirty = true;
        }
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        if self.session != session {
            self.session = session;
            self.dirty = true;
        }
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        if self.status != status {
            self.status = status;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_run(&mut self) {
        self.items.clear();
        self.last_result = None;
        self.session = SessionState::Running;
        self.dirty = true;
    }

    pub(crate) fn push_item(&mut self, row: PinRow) {
        self.items.push(row);
        self.dirty = true;
    }

    pub(crate) fn finish_run(&mut self, result: RunResultKind) {
        self.session = SessionState::Idle;
        self.last_result = Some(result);
        self.dirty = true;
    }
}
