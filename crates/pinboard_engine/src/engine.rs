use std::io;
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::browser::BrowserLauncher;
use crate::config::{DownloadSettings, EngineConfig};
use crate::context::{ChannelProgressSink, ProgressSink, RunContext};
use crate::download::Downloader;
use crate::fetch::{ImageFetcher, ReqwestFetcher};
use crate::run::execute_run;
use crate::scan::BoardScanner;
use crate::webdriver::WebDriverLauncher;
use crate::{BoardTarget, EngineEvent, FetchError};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Http(#[from] FetchError),
}

enum EngineCommand {
    Start(BoardTarget),
    Pause,
    Resume,
    Stop,
}

type RunSlot = Arc<Mutex<Option<RunContext>>>;

fn lock_slot(slot: &RunSlot) -> MutexGuard<'_, Option<RunContext>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the background engine thread.
///
/// Commands are fire-and-forget; results come back as [`EngineEvent`]s in
/// emission order. At most one run is active; `start` while running is ignored.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    slot: RunSlot,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let launcher = Arc::new(WebDriverLauncher::new(config.browser.clone()));
        let fetcher = Arc::new(ReqwestFetcher::new(config.download.fetch.clone())?);
        Self::with_parts(config, launcher, fetcher)
    }

    /// Builds an engine over caller-supplied browser and HTTP backends.
    pub fn with_parts(
        config: EngineConfig,
        launcher: Arc<dyn BrowserLauncher>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("pinboard-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let slot: RunSlot = Arc::new(Mutex::new(None));

        let worker = Worker {
            slot: slot.clone(),
            sink: Arc::new(ChannelProgressSink::new(event_tx)),
            scanner: Arc::new(BoardScanner::new(launcher, config.scan)),
            downloader: Downloader::new(fetcher),
            settings: config.download,
        };
        thread::spawn(move || worker.run(runtime, cmd_rx));

        Ok(Self {
            cmd_tx,
            event_rx,
            slot,
        })
    }

    pub fn start(&self, target: BoardTarget) {
        self.send(EngineCommand::Start(target));
    }

    pub fn pause(&self) {
        self.send(EngineCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(EngineCommand::Resume);
    }

    pub fn stop(&self) {
        self.send(EngineCommand::Stop);
    }

    pub fn is_running(&self) -> bool {
        lock_slot(&self.slot).is_some()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct Worker {
    slot: RunSlot,
    sink: Arc<dyn ProgressSink>,
    scanner: Arc<BoardScanner>,
    downloader: Downloader,
    settings: DownloadSettings,
}

impl Worker {
    fn run(self, runtime: Runtime, cmd_rx: mpsc::Receiver<EngineCommand>) {
        let mut active: Option<JoinHandle<()>> = None;
        while let Ok(command) = cmd_rx.recv() {
            match command {
                EngineCommand::Start(target) => {
                    if let Some(handle) = self.start(&runtime, target) {
                        active = Some(handle);
                    }
                }
                EngineCommand::Pause => self.pause(),
                EngineCommand::Resume => self.resume(),
                EngineCommand::Stop => self.stop(),
            }
        }

        // Handle dropped: stop the run and give it a moment to tear down.
        if let Some(ctx) = lock_slot(&self.slot).as_ref() {
            ctx.cancel();
        }
        if let Some(handle) = active {
            let _ = runtime.block_on(async { tokio::time::timeout(SHUTDOWN_GRACE, handle).await });
        }
        engine_debug!("Engine thread exiting");
    }

    fn start(&self, runtime: &Runtime, target: BoardTarget) -> Option<JoinHandle<()>> {
        if let Err(err) = target.validate() {
            engine_warn!("Rejected run for {}: {}", target.url, err);
            self.sink.emit(EngineEvent::Status(format!("Error: {err}")));
            return None;
        }

        let ctx = {
            let mut slot = lock_slot(&self.slot);
            if slot.is_some() {
                engine_debug!("Run already active; ignoring start for {}", target.url);
                return None;
            }
            let ctx = RunContext::new(self.sink.clone());
            *slot = Some(ctx.clone());
            ctx
        };
        engine_info!(
            "Starting run: url={} max={} mode={:?} dest={:?}",
            target.url,
            target.max_items,
            target.mode,
            target.destination
        );

        let guard = SlotGuard {
            slot: self.slot.clone(),
        };
        let sink = self.sink.clone();
        let scanner = self.scanner.clone();
        let downloader = self.downloader.clone();
        let settings = self.settings.clone();
        Some(runtime.spawn(async move {
            let outcome = execute_run(&target, &ctx, &scanner, &downloader, &settings).await;
            drop(guard);
            sink.emit(EngineEvent::RunFinished(outcome));
        }))
    }

    fn pause(&self) {
        let slot = lock_slot(&self.slot);
        if let Some(ctx) = slot.as_ref() {
            if !ctx.is_cancelled() && ctx.gate().pause() {
                ctx.emit(EngineEvent::Paused);
                ctx.status("Paused. Resume to continue.");
            }
        }
    }

    fn resume(&self) {
        let slot = lock_slot(&self.slot);
        if let Some(ctx) = slot.as_ref() {
            if !ctx.is_cancelled() && ctx.gate().resume() {
                ctx.emit(EngineEvent::Resumed);
                ctx.status("Resuming...");
            }
        }
    }

    fn stop(&self) {
        let slot = lock_slot(&self.slot);
        if let Some(ctx) = slot.as_ref() {
            if !ctx.is_cancelled() {
                ctx.cancel();
                ctx.status("Stopping...");
            }
        }
    }
}

/// Returns the engine to idle when the run task ends, including by panic.
struct SlotGuard {
    slot: RunSlot,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        lock_slot(&self.slot).take();
    }
}
