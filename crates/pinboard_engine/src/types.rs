use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanMode {
    /// Stop at the requested count or when the page stops growing.
    #[default]
    FastLimit,
    /// Additionally stop once the recommendation rail below the board shows up.
    StrictBoardOnly,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::FastLimit => write!(f, "fast limit"),
            ScanMode::StrictBoardOnly => write!(f, "strict board only"),
        }
    }
}

/// Everything a run needs to know about the board. Frozen once the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTarget {
    pub url: String,
    pub max_items: NonZeroUsize,
    pub destination: PathBuf,
    pub mode: ScanMode,
}

impl BoardTarget {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::MissingDestination);
        }
        let parsed = url::Url::parse(&self.url)
            .map_err(|err| ConfigError::InvalidBoardUrl(format!("{}: {err}", self.url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBoardUrl(format!(
                "{}: unsupported scheme {}",
                self.url,
                parsed.scheme()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("select a destination folder first")]
    MissingDestination,
    #[error("invalid board url {0}")]
    InvalidBoardUrl(String),
}

/// One image that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinItem {
    pub source_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { collected: usize, saved: usize },
    NoImages,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Free-form, human-readable progress line.
    Status(String),
    ItemAdded(PinItem),
    Paused,
    Resumed,
    RunFinished(RunOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: bytes::Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
