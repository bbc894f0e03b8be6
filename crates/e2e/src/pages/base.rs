//! Shared page-object plumbing
//!
//! [`BasePage`] wraps a [`PageDriver`] with logging and bounded waits so the
//! concrete page objects never talk to the driver directly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use storefront_common::logging::{self, Logger};

use crate::driver::PageDriver;
use crate::error::E2eResult;
use crate::locator::{Locator, Target};
use crate::wait::{poll_until, poll_value};

/// Where [`BasePage::screenshot`] writes images
pub const SCREENSHOT_DIR: &str = "screenshots";

/// Wait used by `expect_*` when the caller passes no timeout
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Clone)]
pub struct BasePage {
    page: Arc<dyn PageDriver>,
    log: Logger,
    expect_timeout: Duration,
    screenshot_dir: PathBuf,
}

impl BasePage {
    /// Wrap `page`, logging under `name`
    pub fn new(page: Arc<dyn PageDriver>, name: &str) -> Self {
        Self {
            page,
            log: logging::logger(name),
            expect_timeout: DEFAULT_EXPECT_TIMEOUT,
            screenshot_dir: PathBuf::from(SCREENSHOT_DIR),
        }
    }

    pub fn with_expect_timeout(mut self, timeout: Duration) -> Self {
        self.expect_timeout = timeout;
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.page
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }

    pub fn expect_timeout(&self) -> Duration {
        self.expect_timeout
    }

    // Navigation

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        info!(logger = %self.log, "Navigate: {}", url);
        self.page.goto(url).await
    }

    pub async fn reload(&self) -> E2eResult<()> {
        info!(logger = %self.log, "Reload page");
        self.page.reload().await
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.page.url().await
    }

    // Locators

    pub fn by_role(&self, role: &str, name: Option<&str>, exact: bool) -> Locator {
        debug!(logger = %self.log, "Get by role={} name={:?} exact={}", role, name, exact);
        Locator::role(role, name, exact)
    }

    pub fn by_text(&self, text: &str, exact: bool) -> Locator {
        debug!(logger = %self.log, "Get by text='{}' exact={}", text, exact);
        Locator::text(text, exact)
    }

    pub fn by_label(&self, text: &str, exact: bool) -> Locator {
        debug!(logger = %self.log, "Get by label='{}' exact={}", text, exact);
        Locator::label(text, exact)
    }

    pub fn locator(&self, selector: &str) -> Locator {
        debug!(logger = %self.log, "Create locator: {}", selector);
        Locator::css(selector)
    }

    fn resolve(&self, target: impl Into<Target>) -> Locator {
        match target.into() {
            Target::Selector(selector) => self.locator(&selector),
            Target::Locator(locator) => locator,
        }
    }

    // Actions

    pub async fn click(&self, target: impl Into<Target>, force: bool) -> E2eResult<()> {
        let loc = self.resolve(target);
        info!(logger = %self.log, "Click: {} (force={})", loc, force);
        self.page.click(&loc, force).await
    }

    /// Write `text` into an input; with `clear`, empty it first (two driver calls)
    pub async fn fill(&self, target: impl Into<Target>, text: &str, clear: bool) -> E2eResult<()> {
        let loc = self.resolve(target);
        info!(logger = %self.log, "Fill: '{}' into {} (clear={})", text, loc, clear);
        self.fill_resolved(&loc, text, clear).await
    }

    /// Like [`fill`](Self::fill) but keeps the value out of the log
    pub async fn fill_secret(&self, target: impl Into<Target>, text: &str) -> E2eResult<()> {
        let loc = self.resolve(target);
        info!(logger = %self.log, "Fill: '***' into {} (clear=true)", loc);
        self.fill_resolved(&loc, text, true).await
    }

    async fn fill_resolved(&self, loc: &Locator, text: &str, clear: bool) -> E2eResult<()> {
        if clear {
            self.page.fill(loc, "").await?;
        }
        self.page.fill(loc, text).await
    }

    pub async fn type_text(
        &self,
        target: impl Into<Target>,
        text: &str,
        delay: Duration,
    ) -> E2eResult<()> {
        let loc = self.resolve(target);
        info!(logger = %self.log, "Type: '{}' into {} delay={:?}", text, loc, delay);
        self.page.type_text(&loc, text, delay).await
    }

    /// Trimmed text content; empty when the element has none
    pub async fn get_text(&self, target: impl Into<Target>) -> E2eResult<String> {
        let loc = self.resolve(target);
        let value = self.page.text_content(&loc).await?.unwrap_or_default();
        let value = value.trim().to_string();
        debug!(logger = %self.log, "Text from {} => '{}'", loc, value);
        Ok(value)
    }

    /// Trimmed text of every match
    pub async fn get_all_texts(&self, target: impl Into<Target>) -> E2eResult<Vec<String>> {
        let loc = self.resolve(target);
        let values: Vec<String> = self
            .page
            .all_text_contents(&loc)
            .await?
            .iter()
            .map(|v| v.trim().to_string())
            .collect();
        debug!(logger = %self.log, "Texts from {} => {:?}", loc, values);
        Ok(values)
    }

    pub async fn count(&self, target: impl Into<Target>) -> E2eResult<usize> {
        let loc = self.resolve(target);
        let count = self.page.count(&loc).await?;
        debug!(logger = %self.log, "Count {} => {}", loc, count);
        Ok(count)
    }

    /// Single, non-waiting visibility check
    pub async fn is_visible(&self, target: impl Into<Target>) -> E2eResult<bool> {
        let loc = self.resolve(target);
        let visible = self.page.is_visible(&loc).await?;
        debug!(logger = %self.log, "Visible? {} => {}", loc, visible);
        Ok(visible)
    }

    // Expectations

    /// Wait until the target is visible
    pub async fn expect_visible(
        &self,
        target: impl Into<Target>,
        timeout: Option<Duration>,
    ) -> E2eResult<Locator> {
        let loc = self.resolve(target);
        let timeout = timeout.unwrap_or(self.expect_timeout);
        info!(logger = %self.log, "Expect visible: {} within {}ms", loc, timeout.as_millis());

        let page = &self.page;
        poll_until(&format!("{} to be visible", loc), timeout, || page.is_visible(&loc)).await?;
        Ok(loc)
    }

    /// Wait until exactly `expected` elements match
    pub async fn expect_count(
        &self,
        target: impl Into<Target>,
        expected: usize,
        timeout: Option<Duration>,
    ) -> E2eResult<Locator> {
        let loc = self.resolve(target);
        let timeout = timeout.unwrap_or(self.expect_timeout);
        info!(
            logger = %self.log,
            "Expect count={} for {} within {}ms",
            expected,
            loc,
            timeout.as_millis()
        );

        let page = &self.page;
        poll_value(
            &format!("{} to have count {}", loc, expected),
            timeout,
            || page.count(&loc),
            |count| *count == expected,
        )
        .await?;
        Ok(loc)
    }

    /// Capture a full-page screenshot into the screenshot directory
    pub async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(name);
        info!(logger = %self.log, "Screenshot: {}", path.display());
        self.page.screenshot(&path, true).await?;
        Ok(path)
    }
}
