use std::path::PathBuf;

use crate::Mode;

/// Snapshot of the form at the moment Start was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub url: String,
    pub max_items: usize,
    pub destination: PathBuf,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun(RunRequest),
    PauseRun,
    ResumeRun,
    StopRun,
}
