use crate::{AppState, Effect, Msg, PinRow, RunRequest, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        // The form is frozen while a run owns it.
        Msg::BoardUrlChanged(url) => {
            if state.session() == SessionState::Idle {
                state.set_board_url(url.trim().to_string());
            }
            Vec::new()
        }
        Msg::MaxItemsChanged(max_items) => {
            if state.session() == SessionState::Idle {
                state.set_max_items(max_items);
            }
            Vec::new()
        }
        Msg::DestinationChosen(path) => {
            if state.session() == SessionState::Idle {
                state.set_destination(path);
            }
            Vec::new()
        }
        Msg::ModeSelected(mode) => {
            if state.session() == SessionState::Idle {
                state.set_mode(mode);
            }
            Vec::new()
        }
        Msg::StartClicked => start(&mut state),
        Msg::PauseClicked => {
            if state.session() == SessionState::Running {
                state.set_session(SessionState::Paused);
                vec![Effect::PauseRun]
            } else {
                Vec::new()
            }
        }
        Msg::ResumeClicked => {
            if state.session() == SessionState::Paused {
                state.set_session(SessionState::Running);
                vec![Effect::ResumeRun]
            } else {
                Vec::new()
            }
        }
        Msg::StopClicked => match state.session() {
            SessionState::Running | SessionState::Paused => {
                state.set_session(SessionState::Stopping);
                vec![Effect::StopRun]
            }
            SessionState::Idle | SessionState::Stopping => Vec::new(),
        },
        Msg::StatusReported(status) => {
            state.set_status(status);
            Vec::new()
        }
        Msg::ItemDownloaded {
            source_url,
            file_name,
        } => {
            if state.session() != SessionState::Idle {
                state.push_item(PinRow {
                    source_url,
                    file_name,
                });
            }
            Vec::new()
        }
        Msg::EnginePaused => {
            if state.session() == SessionState::Running {
                state.set_session(SessionState::Paused);
            }
            Vec::new()
        }
        Msg::EngineResumed => {
            if state.session() == SessionState::Paused {
                state.set_session(SessionState::Running);
            }
            Vec::new()
        }
        Msg::RunFinished(result) => {
            if state.session() != SessionState::Idle {
                state.finish_run(result);
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut AppState) -> Vec<Effect> {
    let Some(destination) = state.destination().cloned() else {
        state.set_status("Error: Select a folder first.");
        return Vec::new();
    };
    if state.session() != SessionState::Idle {
        return Vec::new();
    }
    if url::Url::parse(state.board_url()).is_err() {
        state.set_status("Error: Enter a valid board URL.");
        return Vec::new();
    }
    if state.max_items() == 0 {
        state.set_status("Error: Pin count must be at least 1.");
        return Vec::new();
    }

    state.begin_run();
    state.set_status(format!("Starting ({})...", state.mode()));
    vec![Effect::StartRun(RunRequest {
        url: state.board_url().to_string(),
        max_items: state.max_items(),
        destination,
        mode: state.mode(),
    })]
}
