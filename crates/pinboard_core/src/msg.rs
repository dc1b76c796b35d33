use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the board URL.
    BoardUrlChanged(String),
    /// User edited the pin count.
    MaxItemsChanged(usize),
    /// User picked the destination folder.
    DestinationChosen(PathBuf),
    ModeSelected(crate::Mode),
    StartClicked,
    PauseClicked,
    ResumeClicked,
    StopClicked,
    /// Engine status line.
    StatusReported(String),
    /// Engine saved (or found) one image.
    ItemDownloaded { source_url: String, file_name: String },
    /// Engine confirmed the gate closed.
    EnginePaused,
    /// Engine confirmed the gate opened.
    EngineResumed,
    /// Engine finished the run, whatever the reason.
    RunFinished(crate::RunResultKind),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
