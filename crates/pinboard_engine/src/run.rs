//! One run: scan the board, then download what was found.

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use thiserror::Error;

use crate::config::DownloadSettings;
use crate::context::{Cancelled, RunContext};
use crate::download::{DownloadError, DownloadOutcome, Downloader};
use crate::filename::pin_file_name;
use crate::persist::{ensure_output_dir, PersistError};
use crate::scan::{BoardScanner, ScanError};
use crate::{BoardTarget, EngineEvent, PinItem, RunOutcome};

#[derive(Debug, Error)]
enum RunError {
    #[error("cancelled")]
    Cancelled,
    #[error(transparent)]
    Scan(ScanError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl From<Cancelled> for RunError {
    fn from(_: Cancelled) -> Self {
        RunError::Cancelled
    }
}

impl From<ScanError> for RunError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Cancelled => RunError::Cancelled,
            other => RunError::Scan(other),
        }
    }
}

/// Runs scan then download under `ctx` and reports the terminal status.
///
/// Never fails: every exit path maps to a [`RunOutcome`].
pub async fn execute_run(
    target: &BoardTarget,
    ctx: &RunContext,
    scanner: &BoardScanner,
    downloader: &Downloader,
    settings: &DownloadSettings,
) -> RunOutcome {
    let outcome = match run_phases(target, ctx, scanner, downloader, settings).await {
        Ok(outcome) => outcome,
        Err(RunError::Cancelled) => RunOutcome::Cancelled,
        Err(err) => {
            engine_error!("Run for {} failed: {}", target.url, err);
            RunOutcome::Failed(err.to_string())
        }
    };

    match &outcome {
        RunOutcome::Completed { .. } => ctx.status("Process completed successfully!"),
        RunOutcome::NoImages => ctx.status("No images found."),
        RunOutcome::Cancelled => ctx.status("Stopped by user."),
        RunOutcome::Failed(detail) => ctx.status(format!("Error: {detail}")),
    }
    engine_info!("Run for {} finished: {:?}", target.url, outcome);
    outcome
}

async fn run_phases(
    target: &BoardTarget,
    ctx: &RunContext,
    scanner: &BoardScanner,
    downloader: &Downloader,
    settings: &DownloadSettings,
) -> Result<RunOutcome, RunError> {
    ctx.status(format!("Starting ({})...", target.mode));
    ensure_output_dir(&target.destination)?;

    let report = scanner.scan(target, ctx).await?;
    engine_info!(
        "Scan of {} stopped ({:?}) with {} pins",
        target.url,
        report.stop,
        report.urls.len()
    );
    if report.urls.is_empty() {
        return Ok(RunOutcome::NoImages);
    }

    let total = report.urls.len();
    ctx.status(format!("Found {total} images. Starting download..."));

    let mut index = 1;
    for url in &report.urls {
        ctx.checkpoint().await?;

        let outcome = match downloader
            .download(url, &target.destination, index, ctx.cancel_token())
            .await
        {
            Ok(outcome) => outcome,
            Err(DownloadError::Cancelled) => return Err(RunError::Cancelled),
            Err(err) => {
                engine_warn!("Skipping {}: {}", url, err);
                continue;
            }
        };

        engine_debug!("{} -> {:?}", url, outcome.path());
        ctx.emit(EngineEvent::ItemAdded(PinItem {
            source_url: url.clone(),
            file_name: pin_file_name(index),
        }));
        ctx.status(format!("Downloading {index}/{total}..."));

        if matches!(outcome, DownloadOutcome::Saved { .. }) {
            if settings.courtesy_every > 0 && index % settings.courtesy_every == 0 {
                ctx.status(format!("Courtesy pause... ({index}/{total})"));
                ctx.sleep(settings.courtesy_delay.sample()).await?;
            } else {
                ctx.sleep(settings.item_delay.sample()).await?;
            }
        }
        index += 1;
    }

    Ok(RunOutcome::Completed {
        collected: total,
        saved: index - 1,
    })
}
