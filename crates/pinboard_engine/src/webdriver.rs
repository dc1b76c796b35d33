use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::browser::{BrowserError, BrowserLauncher, BrowserSession, ScrollProbe, ScrollStrategy};
use crate::config::BrowserSettings;

const PROBE_SCRIPT: &str = "return [window.scrollY, document.body.scrollHeight];";
const SCROLL_VIEWPORT_SCRIPT: &str = "window.scrollBy(0, window.innerHeight);";
const SCROLL_END_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Chrome options that keep the usual automation tells out of the page.
const CHROME_ARGS: [&str; 2] = [
    "--disable-blink-features=AutomationControlled",
    "--start-maximized",
];

/// Launches Chrome through a WebDriver server, spawning `chromedriver` when no
/// external endpoint is configured.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    settings: BrowserSettings,
}

impl WebDriverLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn capabilities(&self) -> Capabilities {
        let mut args: Vec<&str> = CHROME_ARGS.to_vec();
        if self.settings.headless {
            args.push("--headless=new");
        }
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "excludeSwitches": ["enable-automation"],
            }),
        );
        caps
    }

    async fn spawn_driver(&self) -> Result<(Child, String), BrowserError> {
        let port = self.settings.port;
        engine_info!(
            "Spawning {:?} on port {}",
            self.settings.chromedriver_path,
            port
        );
        let child = Command::new(&self.settings.chromedriver_path)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                BrowserError::Launch(format!(
                    "{}: {err}",
                    self.settings.chromedriver_path.display()
                ))
            })?;

        let timeout = Duration::from_millis(self.settings.startup_timeout_ms);
        tokio::time::timeout(timeout, wait_for_port(port))
            .await
            .map_err(|_| {
                BrowserError::Launch(format!("chromedriver did not listen on port {port}"))
            })?;

        Ok((child, format!("http://127.0.0.1:{port}")))
    }
}

async fn wait_for_port(port: u16) {
    while TcpStream::connect(("127.0.0.1", port)).await.is_err() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let (driver, endpoint) = match &self.settings.webdriver_url {
            Some(url) => (None, url.clone()),
            None => {
                let (child, endpoint) = self.spawn_driver().await?;
                (Some(child), endpoint)
            }
        };

        let mut builder =
            ClientBuilder::rustls().map_err(|err| BrowserError::Launch(err.to_string()))?;
        builder.capabilities(self.capabilities());
        let client = builder
            .connect(&endpoint)
            .await
            .map_err(|err| BrowserError::Launch(err.to_string()))?;
        engine_info!("WebDriver session open at {}", endpoint);

        Ok(Box::new(WebDriverSession { client, driver }))
    }
}

pub struct WebDriverSession {
    client: Client,
    driver: Option<Child>,
}

impl WebDriverSession {
    async fn execute(&self, script: &str) -> Result<Value, BrowserError> {
        self.client
            .execute(script, Vec::new())
            .await
            .map_err(|err| BrowserError::Command(err.to_string()))
    }
}

#[async_trait::async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client
            .goto(url)
            .await
            .map_err(|err| BrowserError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            })
    }

    async fn image_sources(&mut self) -> Result<Vec<Result<String, BrowserError>>, BrowserError> {
        let images = self
            .client
            .find_all(Locator::Css("img"))
            .await
            .map_err(|err| BrowserError::Command(err.to_string()))?;

        let mut sources = Vec::with_capacity(images.len());
        for image in images {
            let src = image
                .attr("src")
                .await
                .map(Option::unwrap_or_default)
                .map_err(|err| BrowserError::StaleElement(err.to_string()));
            sources.push(src);
        }
        Ok(sources)
    }

    async fn end_marker_visible(&mut self, markers: &[String]) -> Result<bool, BrowserError> {
        let Some(xpath) = end_marker_xpath(markers) else {
            return Ok(false);
        };
        let headers = self
            .client
            .find_all(Locator::XPath(&xpath))
            .await
            .map_err(|err| BrowserError::Command(err.to_string()))?;

        for header in headers {
            match header.is_displayed().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) => engine_debug!("Skipping end marker candidate: {}", err),
            }
        }
        Ok(false)
    }

    async fn scroll(&mut self, strategy: ScrollStrategy) -> Result<(), BrowserError> {
        let script = match strategy {
            ScrollStrategy::Viewport => SCROLL_VIEWPORT_SCRIPT,
            ScrollStrategy::DocumentEnd => SCROLL_END_SCRIPT,
        };
        self.execute(script).await.map(|_| ())
    }

    async fn probe(&mut self) -> Result<ScrollProbe, BrowserError> {
        let value = self.execute(PROBE_SCRIPT).await?;
        parse_probe(&value)
            .ok_or_else(|| BrowserError::Command(format!("unexpected probe result {value}")))
    }

    async fn shutdown(self: Box<Self>) -> Result<(), BrowserError> {
        let WebDriverSession { client, driver } = *self;
        let closed = client
            .close()
            .await
            .map_err(|err| BrowserError::Command(err.to_string()));
        if let Some(mut driver) = driver {
            if let Err(err) = driver.kill().await {
                engine_warn!("Failed to stop chromedriver: {}", err);
            }
        }
        closed
    }
}

fn parse_probe(value: &Value) -> Option<ScrollProbe> {
    let pair = value.as_array()?;
    let read = |idx: usize| pair.get(idx).and_then(Value::as_f64).map(|v| v.round() as i64);
    Some(ScrollProbe {
        scroll_y: read(0)?,
        document_height: read(1)?,
    })
}

/// XPath matching any element whose own text contains one of `markers`.
pub fn end_marker_xpath(markers: &[String]) -> Option<String> {
    let clauses: Vec<String> = markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .map(|marker| format!("contains(text(), {})", xpath_literal(marker)))
        .collect();
    if clauses.is_empty() {
        return None;
    }
    Some(format!("//*[{}]", clauses.join(" or ")))
}

fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
