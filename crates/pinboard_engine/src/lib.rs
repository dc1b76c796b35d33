//! Pinboard engine: board scanning, image download and run control.
mod browser;
mod classify;
mod config;
mod context;
mod download;
mod engine;
mod fetch;
mod filename;
mod persist;
mod run;
mod scan;
mod types;
mod webdriver;

pub use browser::{BrowserError, BrowserLauncher, BrowserSession, ScrollProbe, ScrollStrategy};
pub use classify::{
    classify, is_eligible, upgrade, ClassifierRules, IMAGE_HOST_MARKER, ORIGINALS_SEGMENT,
    PROFILE_PICTURE_MARKER, THUMBNAIL_SEGMENTS, TINY_THUMBNAIL_MARKER,
};
pub use config::{
    BrowserSettings, DelayRange, DownloadSettings, EngineConfig, FetchSettings, ScanSettings,
    DESKTOP_USER_AGENT,
};
pub use context::{Cancelled, ChannelProgressSink, PauseGate, ProgressSink, RunContext};
pub use download::{DownloadError, DownloadOutcome, Downloader};
pub use engine::{EngineError, EngineHandle};
pub use fetch::{ImageFetcher, ReqwestFetcher};
pub use filename::{pin_file_name, pin_file_path};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use run::execute_run;
pub use scan::{BoardScanner, CollectedUrls, ScanError, ScanReport, ScanStop};
pub use types::{
    BoardTarget, ConfigError, EngineEvent, FailureKind, FetchError, FetchOutput, PinItem,
    RunOutcome, ScanMode,
};
pub use webdriver::{end_marker_xpath, WebDriverLauncher, WebDriverSession};

pub use tokio_util::sync::CancellationToken;
