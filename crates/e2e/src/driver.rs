//! The browser capabilities page objects rely on

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::E2eResult;
use crate::locator::Locator;

/// One open browser tab
///
/// Implementations perform exactly one engine call per method: no logging,
/// no retries, no waiting beyond what the engine itself does for actions.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn reload(&self) -> E2eResult<()>;

    /// Current page URL
    async fn url(&self) -> E2eResult<String>;

    async fn click(&self, locator: &Locator, force: bool) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    /// Send key presses one character at a time
    async fn type_text(&self, locator: &Locator, text: &str, delay: Duration) -> E2eResult<()>;

    /// Text content of the single matching element (`None` when it has none)
    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>>;

    /// Text content of every matching element, in document order
    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>>;

    /// Single visibility check; absent elements are not visible
    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    /// Number of elements currently matching
    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()>;
}
