use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::browser::ScrollStrategy;
use crate::classify::ClassifierRules;

/// Desktop Chrome user agent sent with every image request.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Inclusive millisecond range a delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange::fixed(0);

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub browser: BrowserSettings,
    pub scan: ScanSettings,
    pub download: DownloadSettings,
}

impl EngineConfig {
    /// Zero delays everywhere; handy for tests and dry runs against local pages.
    pub fn without_delays() -> Self {
        let mut config = Self::default();
        config.scan.settle_delay = DelayRange::ZERO;
        config.scan.scroll_delay = DelayRange::ZERO;
        config.scan.stagnation_backoff = DelayRange::ZERO;
        config.download.item_delay = DelayRange::ZERO;
        config.download.courtesy_delay = DelayRange::ZERO;
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Driver binary spawned when `webdriver_url` is unset.
    pub chromedriver_path: PathBuf,
    pub port: u16,
    /// Connect to an already running WebDriver instead of spawning one.
    pub webdriver_url: Option<String>,
    pub headless: bool,
    pub startup_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chromedriver_path: PathBuf::from("chromedriver"),
            port: 9515,
            webdriver_url: None,
            headless: false,
            startup_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Wait after navigation so the first batch of pins can render.
    pub settle_delay: DelayRange,
    pub scroll_delay: DelayRange,
    /// Extra wait after a probe that saw no movement. Off by default.
    pub stagnation_backoff: DelayRange,
    pub stagnation_threshold: u32,
    pub scroll_strategy: ScrollStrategy,
    /// Headings that mark the end of the board in strict mode.
    pub end_markers: Vec<String>,
    pub classifier: ClassifierRules,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            settle_delay: DelayRange::fixed(5_000),
            scroll_delay: DelayRange::new(1_500, 3_000),
            stagnation_backoff: DelayRange::ZERO,
            stagnation_threshold: 4,
            scroll_strategy: ScrollStrategy::Viewport,
            end_markers: vec![
                "More like this".to_string(),
                "More ideas".to_string(),
                "Más como esto".to_string(),
            ],
            classifier: ClassifierRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Pause after each fetched image.
    pub item_delay: DelayRange,
    /// Every n-th saved image triggers `courtesy_delay`. Zero disables it.
    pub courtesy_every: usize,
    pub courtesy_delay: DelayRange,
    pub fetch: FetchSettings,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            item_delay: DelayRange::new(100, 300),
            courtesy_every: 50,
            courtesy_delay: DelayRange::fixed(2_000),
            fetch: FetchSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
}

impl FetchSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_USER_AGENT.to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 60_000,
            max_bytes: 50 * 1024 * 1024,
        }
    }
}
