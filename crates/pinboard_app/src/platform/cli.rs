use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use pinboard_core::{Mode, Msg, DEFAULT_MAX_ITEMS};

/// Scroll a board, collect full-resolution pin images and save them as
/// Pin_001.jpg, Pin_002.jpg, ...
///
/// While running, type `p` to pause, `r` to resume and `s` to stop.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Board URL to scan.
    pub url: String,
    /// Destination folder for the images.
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,
    /// Maximum number of pins to collect.
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITEMS)]
    pub max: usize,
    /// Whether the end-of-board marker stops the scan.
    #[arg(long, value_enum, default_value_t = ModeArg::Fast)]
    pub mode: ModeArg,
    /// RON file overriding engine defaults.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Where log records go.
    #[arg(long, value_enum, default_value_t = LogArg::File)]
    pub log: LogArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Stop only at the pin limit or when scrolling stalls.
    Fast,
    /// Also stop at the "more like this" section.
    Strict,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Fast => Mode::FastLimit,
            ModeArg::Strict => Mode::StrictBoardOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    Terminal,
    File,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(value: LogArg) -> Self {
        match value {
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::File => LogDestination::File,
            LogArg::Both => LogDestination::Both,
        }
    }
}

impl Args {
    /// Form messages that fill in the run before Start is pressed.
    pub fn form_messages(&self) -> Vec<Msg> {
        vec![
            Msg::BoardUrlChanged(self.url.clone()),
            Msg::MaxItemsChanged(self.max),
            Msg::DestinationChosen(self.out.clone()),
            Msg::ModeSelected(self.mode.into()),
        ]
    }
}

/// Maps one line typed on stdin to a control message.
///
/// `q` stops too; the shell exits once the run has wound down. Unknown input
/// yields `None`.
pub fn parse_command(line: &str) -> Option<Msg> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(Msg::PauseClicked),
        "r" | "resume" => Some(Msg::ResumeClicked),
        "s" | "stop" | "q" | "quit" => Some(Msg::StopClicked),
        _ => None,
    }
}
