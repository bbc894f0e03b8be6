//! Playwright browser automation
//!
//! Playwright runs inside one long-lived `node` process started from a
//! generated driver script. Requests and replies travel as JSON lines over the
//! child's stdin/stdout, so browser, context and page state survive between
//! calls. Contexts and pages are addressed by the numeric ids the driver
//! hands out.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use storefront_common::{BrowserKind, UiSettings};

use crate::driver::PageDriver;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

const DRIVER_SCRIPT: &str = include_str!("playwright_driver.js");

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// `node` executable
    pub node_binary: PathBuf,

    /// Directory whose `node_modules` provides the `playwright` package
    pub working_dir: PathBuf,

    pub browser: BrowserKind,
    pub headless: bool,
    pub slow_mo_ms: u64,

    /// Default timeout for actions inside each browser context
    pub action_timeout_ms: u64,

    /// How long to wait for the driver to come up
    pub startup_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            working_dir: PathBuf::from("."),
            browser: BrowserKind::Chromium,
            headless: true,
            slow_mo_ms: 0,
            action_timeout_ms: 10_000,
            startup_timeout: Duration::from_secs(30),
        }
    }
}

impl PlaywrightConfig {
    pub fn from_settings(ui: &UiSettings) -> Self {
        Self {
            browser: ui.browser,
            headless: ui.headless,
            slow_mo_ms: ui.slow_mo_ms,
            action_timeout_ms: ui.timeout_ms,
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

struct Connection {
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl Connection {
    async fn read_response(&mut self, id: u64, method: &str) -> E2eResult<Response> {
        loop {
            let line = self.stdout.next_line().await?.ok_or_else(|| {
                E2eError::Playwright(format!("driver exited while handling '{}'", method))
            })?;

            match serde_json::from_str::<Response>(&line) {
                Ok(response) if response.id == id => return Ok(response),
                Ok(response) => warn!("Dropping stale driver reply {}", response.id),
                Err(_) => debug!("[driver stdout] {}", line),
            }
        }
    }
}

/// The driver process and its request channel
struct Bridge {
    conn: Mutex<Connection>,
    child: Mutex<Child>,
    _script_dir: tempfile::TempDir,
}

impl Bridge {
    async fn spawn(config: &PlaywrightConfig) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("playwright_driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        debug!("Starting Playwright driver: {}", script_path.display());

        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .current_dir(&config.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                E2eError::Playwright(format!(
                    "failed to spawn {}: {}",
                    config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[driver] {}", line);
                }
            });
        }

        let mut conn = Connection {
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
        };

        // The driver announces itself with id 0 once `playwright` is loaded.
        match timeout(config.startup_timeout, conn.read_response(0, "startup")).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(E2eError::Timeout {
                    what: "Playwright driver startup".to_string(),
                    timeout_ms: config.startup_timeout.as_millis() as u64,
                })
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            child: Mutex::new(child),
            _script_dir: script_dir,
        })
    }

    async fn call(&self, method: &str, params: Value) -> E2eResult<Value> {
        let mut conn = self.conn.lock().await;
        conn.next_id += 1;
        let id = conn.next_id;

        let mut line = serde_json::to_string(&Request { id, method, params })?;
        line.push('\n');

        let stdin = conn
            .stdin
            .as_mut()
            .ok_or_else(|| E2eError::Playwright("driver already shut down".to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;

        let response = conn.read_response(id, method).await?;
        match response.error {
            Some(message) => Err(E2eError::Driver {
                command: method.to_string(),
                message,
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }

    async fn call_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> E2eResult<T> {
        let value = self.call(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Close the driver's stdin and wait for it to exit
    async fn shutdown(&self, grace: Duration) -> E2eResult<()> {
        drop(self.conn.lock().await.stdin.take());

        let mut child = self.child.lock().await;
        match timeout(grace, child.wait()).await {
            Ok(status) => {
                debug!("Playwright driver exited: {}", status?);
            }
            Err(_) => {
                warn!("Playwright driver did not exit within {:?}, killing", grace);
                child.kill().await?;
            }
        }
        Ok(())
    }
}

/// A launched browser
pub struct PlaywrightHandle {
    bridge: Arc<Bridge>,
    config: PlaywrightConfig,
    version: String,
}

#[derive(Deserialize)]
struct Launched {
    version: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextCreated {
    context_id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageCreated {
    page_id: u64,
}

impl PlaywrightHandle {
    /// Start the driver and launch the configured browser
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed(&config)?;

        let bridge = Bridge::spawn(&config).await?;
        let launched: Launched = bridge
            .call_as(
                "launch",
                json!({
                    "browser": config.browser.as_str(),
                    "headless": config.headless,
                    "slowMo": config.slow_mo_ms,
                }),
            )
            .await?;

        debug!("Playwright driver ready, {} {}", config.browser, launched.version);

        Ok(Self {
            bridge: Arc::new(bridge),
            config,
            version: launched.version,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed(config: &PlaywrightConfig) -> E2eResult<()> {
        let status = Command::new("npx")
            .args(["--no-install", "playwright", "--version"])
            .current_dir(&config.working_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Open a fresh, isolated browsing context
    pub async fn new_context(&self) -> E2eResult<BrowserContext> {
        let created: ContextCreated = self
            .bridge
            .call_as(
                "newContext",
                json!({ "timeoutMs": self.config.action_timeout_ms }),
            )
            .await?;

        debug!("Opened browser context {}", created.context_id);
        Ok(BrowserContext {
            id: created.context_id,
            bridge: self.bridge.clone(),
        })
    }

    /// Close the browser and stop the driver
    pub async fn close(self) -> E2eResult<()> {
        let closed = self.bridge.call("close", Value::Null).await;
        self.bridge.shutdown(Duration::from_secs(5)).await?;
        closed.map(|_| ())
    }
}

/// An isolated set of cookies, storage and pages
pub struct BrowserContext {
    id: u64,
    bridge: Arc<Bridge>,
}

impl BrowserContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn new_page(&self) -> E2eResult<PlaywrightPage> {
        let created: PageCreated = self
            .bridge
            .call_as("newPage", json!({ "contextId": self.id }))
            .await?;

        Ok(PlaywrightPage {
            id: created.page_id,
            bridge: self.bridge.clone(),
        })
    }

    /// Close the context and every page in it
    pub async fn close(&self) -> E2eResult<()> {
        self.bridge
            .call("closeContext", json!({ "contextId": self.id }))
            .await?;
        debug!("Closed browser context {}", self.id);
        Ok(())
    }
}

/// One tab inside a [`BrowserContext`]
pub struct PlaywrightPage {
    id: u64,
    bridge: Arc<Bridge>,
}

impl PlaywrightPage {
    pub fn id(&self) -> u64 {
        self.id
    }

    async fn locator_call(&self, method: &str, locator: &Locator, extra: Value) -> E2eResult<Value> {
        let mut params = json!({ "pageId": self.id, "locator": locator });
        if let (Some(params), Value::Object(extra)) = (params.as_object_mut(), extra) {
            params.extend(extra);
        }
        self.bridge.call(method, params).await
    }
}

#[async_trait]
impl PageDriver for PlaywrightPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.bridge
            .call("goto", json!({ "pageId": self.id, "url": url }))
            .await?;
        Ok(())
    }

    async fn reload(&self) -> E2eResult<()> {
        self.bridge.call("reload", json!({ "pageId": self.id })).await?;
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        self.bridge.call_as("url", json!({ "pageId": self.id })).await
    }

    async fn click(&self, locator: &Locator, force: bool) -> E2eResult<()> {
        self.locator_call("click", locator, json!({ "force": force }))
            .await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.locator_call("fill", locator, json!({ "value": value }))
            .await?;
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> E2eResult<()> {
        self.locator_call(
            "type",
            locator,
            json!({ "text": text, "delayMs": delay.as_millis() as u64 }),
        )
        .await?;
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let value = self.locator_call("textContent", locator, Value::Null).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let value = self
            .locator_call("allTextContents", locator, Value::Null)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let value = self.locator_call("isVisible", locator, Value::Null).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self.locator_call("count", locator, Value::Null).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        // The driver runs in its own working directory.
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        self.bridge
            .call(
                "screenshot",
                json!({ "pageId": self.id, "path": path, "fullPage": full_page }),
            )
            .await?;
        Ok(())
    }
}
