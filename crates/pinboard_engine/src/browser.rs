use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("failed to open {url}: {message}")]
    Navigation { url: String, message: String },
    #[error("browser command failed: {0}")]
    Command(String),
    /// The element went away between enumeration and the attribute read.
    #[error("stale element: {0}")]
    StaleElement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScrollStrategy {
    /// `window.scrollBy(0, window.innerHeight)`
    #[default]
    Viewport,
    /// `window.scrollTo(0, document.body.scrollHeight)`
    DocumentEnd,
}

/// Where the page is and how tall it has grown; equal probes mean no progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollProbe {
    pub scroll_y: i64,
    pub document_height: i64,
}

/// A live, exclusively owned browser tab.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// `src` of every rendered `<img>`, one entry per element. Per-element
    /// failures are reported inline so the caller can skip them.
    async fn image_sources(&mut self) -> Result<Vec<Result<String, BrowserError>>, BrowserError>;

    /// Whether any of `markers` is rendered as visible text.
    async fn end_marker_visible(&mut self, markers: &[String]) -> Result<bool, BrowserError>;

    async fn scroll(&mut self, strategy: ScrollStrategy) -> Result<(), BrowserError>;

    async fn probe(&mut self) -> Result<ScrollProbe, BrowserError>;

    async fn shutdown(self: Box<Self>) -> Result<(), BrowserError>;
}

#[async_trait::async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}
