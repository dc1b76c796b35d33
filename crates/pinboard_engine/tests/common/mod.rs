#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinboard_engine::{
    BrowserError, BrowserLauncher, BrowserSession, CancellationToken, EngineEvent, FailureKind,
    FetchError, FetchOutput, ImageFetcher, ProgressSink, ScrollProbe, ScrollStrategy,
};

pub fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn pin(id: &str, size: &str) -> String {
    format!("https://i.pinimg.com/{size}/ab/cd/{id}.jpg")
}

pub fn original(id: &str) -> String {
    pin(id, "originals")
}

/// What the page looks like during one scroll iteration.
#[derive(Clone)]
pub struct Pass {
    pub sources: Vec<Result<String, BrowserError>>,
    pub end_marker: bool,
    pub probe: ScrollProbe,
}

impl Pass {
    pub fn new(sources: &[&str], scroll_y: i64) -> Self {
        Self {
            sources: sources.iter().map(|s| Ok(s.to_string())).collect(),
            end_marker: false,
            probe: ScrollProbe {
                scroll_y,
                document_height: 10_000,
            },
        }
    }

    pub fn with_end_marker(mut self) -> Self {
        self.end_marker = true;
        self
    }

    pub fn with_stale_element(mut self) -> Self {
        self.sources
            .insert(0, Err(BrowserError::StaleElement("node detached".into())));
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    pub launches: usize,
    pub navigated: Vec<String>,
    pub image_reads: usize,
    pub marker_checks: usize,
    pub scrolls: Vec<ScrollStrategy>,
    pub probes: usize,
    pub shutdowns: usize,
}

/// Launcher handing out sessions that replay `passes`; the last pass repeats.
#[derive(Clone)]
pub struct ScriptedLauncher {
    passes: Vec<Pass>,
    pub log: Arc<Mutex<SessionLog>>,
    fail_launch: bool,
    fail_navigation: bool,
    navigate_delay: Duration,
}

impl ScriptedLauncher {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self {
            passes,
            log: Arc::new(Mutex::new(SessionLog::default())),
            fail_launch: false,
            fail_navigation: false,
            navigate_delay: Duration::ZERO,
        }
    }

    /// Navigation that takes `delay` before the page answers.
    pub fn with_slow_navigation(mut self, delay: Duration) -> Self {
        self.navigate_delay = delay;
        self
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn failing_navigation() -> Self {
        Self {
            fail_navigation: true,
            ..Self::new(vec![Pass::new(&[], 0)])
        }
    }

    pub fn log(&self) -> SessionLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        self.log.lock().unwrap().launches += 1;
        if self.fail_launch {
            return Err(BrowserError::Launch("chromedriver not found".into()));
        }
        Ok(Box::new(ScriptedSession {
            passes: self.passes.clone(),
            current: 0,
            log: self.log.clone(),
            fail_navigation: self.fail_navigation,
            navigate_delay: self.navigate_delay,
        }))
    }
}

struct ScriptedSession {
    passes: Vec<Pass>,
    current: usize,
    log: Arc<Mutex<SessionLog>>,
    fail_navigation: bool,
    navigate_delay: Duration,
}

impl ScriptedSession {
    fn pass(&self) -> Pass {
        let idx = self.current.min(self.passes.len().saturating_sub(1));
        self.passes
            .get(idx)
            .cloned()
            .unwrap_or_else(|| Pass::new(&[], 0))
    }
}

#[async_trait::async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.log.lock().unwrap().navigated.push(url.to_string());
        if !self.navigate_delay.is_zero() {
            tokio::time::sleep(self.navigate_delay).await;
        }
        if self.fail_navigation {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        Ok(())
    }

    async fn image_sources(&mut self) -> Result<Vec<Result<String, BrowserError>>, BrowserError> {
        self.log.lock().unwrap().image_reads += 1;
        Ok(self.pass().sources)
    }

    async fn end_marker_visible(&mut self, markers: &[String]) -> Result<bool, BrowserError> {
        self.log.lock().unwrap().marker_checks += 1;
        Ok(!markers.is_empty() && self.pass().end_marker)
    }

    async fn scroll(&mut self, strategy: ScrollStrategy) -> Result<(), BrowserError> {
        self.log.lock().unwrap().scrolls.push(strategy);
        Ok(())
    }

    async fn probe(&mut self) -> Result<ScrollProbe, BrowserError> {
        self.log.lock().unwrap().probes += 1;
        let probe = self.pass().probe;
        self.current += 1;
        Ok(probe)
    }

    async fn shutdown(self: Box<Self>) -> Result<(), BrowserError> {
        self.log.lock().unwrap().shutdowns += 1;
        Err(BrowserError::Command("session already closed".into()))
    }
}

/// In-memory fetcher: serves `body_for(url)` unless the url is marked broken.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    broken: Arc<Mutex<Vec<String>>>,
    pub calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken(self, url: &str) -> Self {
        self.broken.lock().unwrap().push(url.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn body_for(url: &str) -> Vec<u8> {
        format!("image:{url}").into_bytes()
    }
}

#[async_trait::async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchOutput, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if cancel.is_cancelled() {
            return Err(FetchError {
                kind: FailureKind::Cancelled,
                message: "cancelled".into(),
            });
        }
        if self.broken.lock().unwrap().iter().any(|b| b == url) {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: "404 Not Found".into(),
            });
        }
        Ok(FetchOutput {
            bytes: Self::body_for(url).into(),
        })
    }
}

#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn items(&self) -> Vec<pinboard_engine::PinItem> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::ItemAdded(item) => Some(item),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
