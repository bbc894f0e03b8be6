//! Scenario runner
//!
//! Runs registered scenarios one at a time against shared [`Fixtures`],
//! giving each UI scenario a fresh page and tearing everything down whatever
//! the outcome.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use storefront_common::logging::{self, Logger};
use storefront_common::{AirportData, Settings};

use crate::api::AirportGapClient;
use crate::driver::PageDriver;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::{Fixtures, TestPage};
use crate::pages::{BasePage, InventoryPage, LoginPage, SCREENSHOT_DIR};

/// Scenario category, used for selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Drives the storefront in a browser
    Ui,
    /// Talks to the Airport Gap API
    Api,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Ui => "ui",
            Marker::Api => "api",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, E2eResult<()>>;

/// A named, marked test body
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub marker: Marker,
    pub run: ScenarioFn,
}

impl Scenario {
    pub const fn new(name: &'static str, marker: Marker, run: ScenarioFn) -> Self {
        Self { name, marker, run }
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("marker", &self.marker)
            .finish()
    }
}

/// What a scenario body can reach
pub struct ScenarioContext {
    settings: Arc<Settings>,
    page: Option<Arc<dyn PageDriver>>,
    api: Option<Arc<AirportGapClient>>,
    log: Logger,
}

impl ScenarioContext {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn airports(&self) -> &AirportData {
        &self.settings.airports
    }

    /// Scenario-level logger
    pub fn logger(&self) -> &Logger {
        &self.log
    }

    pub fn page(&self) -> E2eResult<Arc<dyn PageDriver>> {
        self.page
            .clone()
            .ok_or_else(|| E2eError::Fixture("no page for this scenario".to_string()))
    }

    pub fn api(&self) -> E2eResult<&AirportGapClient> {
        self.api
            .as_deref()
            .ok_or_else(|| E2eError::Fixture("no API context for this scenario".to_string()))
    }

    pub fn login_page(&self) -> E2eResult<LoginPage> {
        Ok(LoginPage::new(self.page()?, &self.settings))
    }

    pub fn inventory_page(&self) -> E2eResult<InventoryPage> {
        Ok(InventoryPage::new(self.page()?, &self.settings))
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub marker: Marker,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub output_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub screenshot_on_failure: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results"),
            screenshot_dir: PathBuf::from(SCREENSHOT_DIR),
            screenshot_on_failure: true,
        }
    }
}

pub struct TestRunner {
    fixtures: Fixtures,
    scenarios: Vec<Scenario>,
    config: RunnerConfig,
    log: Logger,
}

impl TestRunner {
    pub fn new(fixtures: Fixtures, scenarios: Vec<Scenario>) -> Self {
        Self::with_config(fixtures, scenarios, RunnerConfig::default())
    }

    pub fn with_config(fixtures: Fixtures, scenarios: Vec<Scenario>, config: RunnerConfig) -> Self {
        Self {
            fixtures,
            scenarios,
            config,
            log: logging::logger("Runner"),
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scenarios matching both filters, in registration order
    pub fn select(&self, marker: Option<Marker>, name: Option<&str>) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .filter(|s| marker.map_or(true, |m| s.marker == m))
            .filter(|s| name.map_or(true, |n| s.name == n))
            .copied()
            .collect()
    }

    pub async fn run_all(&self) -> TestSuiteResult {
        let all = self.scenarios.clone();
        self.run_scenarios(&all).await
    }

    pub async fn run_marked(&self, marker: Marker) -> TestSuiteResult {
        let selected = self.select(Some(marker), None);
        self.run_scenarios(&selected).await
    }

    /// Run one scenario by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestResult> {
        let scenario = self
            .scenarios
            .iter()
            .find(|s| s.name == name)
            .copied()
            .ok_or_else(|| E2eError::Fixture(format!("Test not found: {}", name)))?;
        Ok(self.run_scenario(&scenario).await)
    }

    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());
        let mut passed = 0;
        let mut failed = 0;

        info!(logger = %self.log, "Running {} test(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(scenario).await;
            if result.success {
                passed += 1;
                info!(logger = %self.log, "✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    logger = %self.log,
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let skipped = self.scenarios.len().saturating_sub(scenarios.len());

        info!(
            logger = %self.log,
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed,
            failed,
            skipped,
            duration_ms
        );

        TestSuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Run one scenario with its own page; never fails, failures are recorded
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        debug!(logger = %self.log, "Running test: {} [{}]", scenario.name, scenario.marker);

        let mut test_page: Option<TestPage> = None;
        let mut api = None;
        let setup = match scenario.marker {
            Marker::Ui => self.fixtures.new_page().await.map(|p| test_page = Some(p)),
            Marker::Api => self.fixtures.api().await.map(|c| api = Some(c)),
        };

        let mut screenshot = None;
        let mut test_error = match setup {
            Err(e) => Some(format!("fixture setup failed: {}", e)),
            Ok(()) => {
                let ctx = ScenarioContext {
                    settings: self.fixtures.settings().clone(),
                    page: test_page.as_ref().map(TestPage::driver),
                    api,
                    log: logging::logger(scenario.name),
                };

                let outcome = AssertUnwindSafe((scenario.run)(&ctx)).catch_unwind().await;
                let failure = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(panic) => Some(format!("panicked: {}", panic_message(&*panic))),
                };

                if failure.is_some() && self.config.screenshot_on_failure {
                    if let Some(page) = &ctx.page {
                        screenshot = self.failure_screenshot(page, scenario.name).await;
                    }
                }
                failure
            }
        };

        if let Some(page) = test_page {
            if let Err(e) = page.close().await {
                warn!(logger = %self.log, "Failed to close page for {}: {}", scenario.name, e);
                test_error.get_or_insert_with(|| format!("page teardown failed: {}", e));
            }
        }

        TestResult {
            name: scenario.name.to_string(),
            marker: scenario.marker,
            success: test_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: test_error,
            screenshot,
        }
    }

    async fn failure_screenshot(&self, page: &Arc<dyn PageDriver>, name: &str) -> Option<PathBuf> {
        let base = BasePage::new(page.clone(), "Runner")
            .with_screenshot_dir(&self.config.screenshot_dir);
        match base.screenshot(&format!("failure-{}.png", name)).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(logger = %self.log, "Failure screenshot for {} not taken: {}", name, e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!(logger = %self.log, "Results written to: {}", path.display());
        Ok(path)
    }

    /// Release session fixtures
    pub async fn teardown(self) -> E2eResult<()> {
        self.fixtures.teardown().await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
