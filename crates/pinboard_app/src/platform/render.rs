use std::io::{self, Write};

use pinboard_core::{AppViewModel, RunResultKind, SessionState};

/// Prints what changed between successive views.
pub struct Renderer<W: Write> {
    out: W,
    last_status: Option<String>,
    items_shown: usize,
    last_session: SessionState,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_status: None,
            items_shown: 0,
            last_session: SessionState::Idle,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.items.len() < self.items_shown {
            self.items_shown = 0;
        }
        for item in &view.items[self.items_shown..] {
            writeln!(self.out, "  + {}  <- {}", item.file_name, item.source_url)?;
        }
        self.items_shown = view.items.len();

        if self.last_status.as_deref() != Some(view.status.as_str()) {
            writeln!(self.out, "{}", view.status)?;
            self.last_status = Some(view.status.clone());
        }

        if view.session != self.last_session {
            if let Some(hint) = controls_hint(view) {
                writeln!(self.out, "{hint}")?;
            }
            self.last_session = view.session;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn controls_hint(view: &AppViewModel) -> Option<&'static str> {
    if view.can_pause() {
        Some("[p] pause  [s] stop")
    } else if view.can_resume() {
        Some("[r] resume  [s] stop")
    } else {
        None
    }
}

/// One-line summary for the end of a run.
pub fn summary(result: &RunResultKind, items: usize) -> String {
    match result {
        RunResultKind::Completed { saved } => format!("{saved} image(s) in the destination folder."),
        RunResultKind::NoImages => "Nothing to download.".to_string(),
        RunResultKind::Cancelled => format!("Stopped after {items} image(s)."),
        RunResultKind::Failed(detail) => format!("Run failed: {detail}"),
    }
}
