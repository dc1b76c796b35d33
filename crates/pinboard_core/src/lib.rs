//! Pinboard core: pure shell state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, RunRequest};
pub use msg::Msg;
pub use state::{AppState, Mode, PinRow, RunResultKind, SessionState, DEFAULT_MAX_ITEMS};
pub use update::update;
pub use view_model::AppViewModel;
