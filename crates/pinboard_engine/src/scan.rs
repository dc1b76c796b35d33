use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;

use crate::browser::{BrowserError, BrowserLauncher, BrowserSession, ScrollProbe};
use crate::config::ScanSettings;
use crate::context::{Cancelled, RunContext};
use crate::{BoardTarget, ScanMode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("cancelled")]
    Cancelled,
}

impl From<Cancelled> for ScanError {
    fn from(_: Cancelled) -> Self {
        ScanError::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    TargetReached,
    /// Strict mode saw the recommendation rail below the board.
    EndOfBoard,
    /// The page stopped moving for `stagnation_threshold` probes in a row.
    Stagnated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Upgraded URLs in first-seen order, at most `max_items` of them.
    pub urls: Vec<String>,
    pub stop: ScanStop,
}

/// Upgraded URLs in first-seen order, deduplicated by the upgraded string.
#[derive(Debug, Default)]
pub struct CollectedUrls {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl CollectedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the URL was not seen before.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_limited(mut self, limit: usize) -> Vec<String> {
        self.order.truncate(limit);
        self.order
    }
}

pub struct BoardScanner {
    launcher: Arc<dyn BrowserLauncher>,
    settings: ScanSettings,
}

impl BoardScanner {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: ScanSettings) -> Self {
        Self { launcher, settings }
    }

    /// Opens the board, scrolls and collects until a stop condition, then
    /// tears the browser down whatever happened.
    pub async fn scan(
        &self,
        target: &BoardTarget,
        ctx: &RunContext,
    ) -> Result<ScanReport, ScanError> {
        ctx.checkpoint().await?;
        let mut session = guarded(ctx, self.launcher.launch()).await?;
        let result = self.drive(session.as_mut(), target, ctx).await;
        if let Err(err) = session.shutdown().await {
            engine_warn!("Browser teardown failed: {}", err);
        }
        result
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        target: &BoardTarget,
        ctx: &RunContext,
    ) -> Result<ScanReport, ScanError> {
        let max_items = target.max_items.get();

        ctx.status("Accessing board...");
        guarded(ctx, session.navigate(&target.url)).await?;
        ctx.sleep(self.settings.settle_delay.sample()).await?;

        ctx.status("Scanning board...");
        let mut collected = CollectedUrls::new();
        let mut last_probe: Option<ScrollProbe> = None;
        let mut unchanged = 0u32;
        let mut stop = ScanStop::TargetReached;

        while collected.len() < max_items {
            ctx.checkpoint().await?;

            if target.mode == ScanMode::StrictBoardOnly
                && guarded(ctx, session.end_marker_visible(&self.settings.end_markers)).await?
            {
                engine_info!("End of board marker visible after {} pins", collected.len());
                ctx.status("End of board detected. Stopping search.");
                stop = ScanStop::EndOfBoard;
                break;
            }

            let before = collected.len();
            for source in guarded(ctx, session.image_sources()).await? {
                match source {
                    Ok(raw) => {
                        if let Some(url) = self.settings.classifier.classify(&raw) {
                            collected.insert(url);
                        }
                    }
                    Err(err) => engine_debug!("Skipping image element: {}", err),
                }
            }
            engine_debug!(
                "Scan pass added {} pins ({} total)",
                collected.len() - before,
                collected.len()
            );

            ctx.status(format!("Found {} / {} pins...", collected.len(), max_items));

            if collected.len() >= max_items {
                break;
            }

            guarded(ctx, session.scroll(self.settings.scroll_strategy)).await?;
            ctx.sleep(self.settings.scroll_delay.sample()).await?;

            let probe = guarded(ctx, session.probe()).await?;
            if last_probe == Some(probe) {
                unchanged += 1;
                if unchanged >= self.settings.stagnation_threshold {
                    engine_info!("Page stopped growing after {} pins", collected.len());
                    stop = ScanStop::Stagnated;
                    break;
                }
                ctx.sleep(self.settings.stagnation_backoff.sample()).await?;
            } else {
                unchanged = 0;
                last_probe = Some(probe);
            }
        }

        Ok(ScanReport {
            urls: collected.into_limited(max_items),
            stop,
        })
    }
}

/// Runs one browser call, giving up as soon as the run is cancelled.
async fn guarded<T, F>(ctx: &RunContext, call: F) -> Result<T, ScanError>
where
    F: Future<Output = Result<T, BrowserError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancel_token().cancelled() => Err(ScanError::Cancelled),
        result = call => result.map_err(ScanError::from),
    }
}
