use std::path::PathBuf;

use crate::{Mode, PinRow, RunResultKind, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub board_url: String,
    pub max_items: usize,
    pub destination: Option<PathBuf>,
    pub mode: Mode,
    pub status: String,
    pub items: Vec<PinRow>,
    pub last_result: Option<RunResultKind>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn can_start(&self) -> bool {
        self.session == SessionState::Idle
    }

    pub fn can_pause(&self) -> bool {
        self.session == SessionState::Running
    }

    pub fn can_resume(&self) -> bool {
        self.session == SessionState::Paused
    }

    pub fn can_stop(&self) -> bool {
        matches!(self.session, SessionState::Running | SessionState::Paused)
    }
}
