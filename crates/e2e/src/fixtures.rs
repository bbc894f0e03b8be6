//! Session and per-test resources
//!
//! The browser and the API client are created lazily on first use and live
//! for the whole run. Every UI test gets its own browsing context. Whatever
//! was opened is closed by [`Fixtures::teardown`].

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use storefront_common::logging::{self, Logger};
use storefront_common::{AirportData, Settings};

use crate::api::AirportGapClient;
use crate::driver::PageDriver;
use crate::error::{E2eError, E2eResult};
use crate::playwright::{BrowserContext, PlaywrightConfig, PlaywrightHandle};

#[cfg(test)]
type PageFactory = Arc<dyn Fn() -> Arc<dyn PageDriver> + Send + Sync>;

enum PageSource {
    Playwright {
        config: PlaywrightConfig,
        browser: OnceCell<PlaywrightHandle>,
    },
    #[cfg(test)]
    Fake(PageFactory),
}

/// A page scoped to one test
pub struct TestPage {
    page: Arc<dyn PageDriver>,
    context: Option<BrowserContext>,
}

impl TestPage {
    pub fn driver(&self) -> Arc<dyn PageDriver> {
        self.page.clone()
    }

    /// Close the page's context
    pub async fn close(self) -> E2eResult<()> {
        if let Some(context) = self.context {
            context.close().await?;
        }
        Ok(())
    }
}

pub struct Fixtures {
    settings: Arc<Settings>,
    pages: PageSource,
    api: OnceCell<Arc<AirportGapClient>>,
    log: Logger,
}

impl Fixtures {
    pub fn new(settings: Arc<Settings>) -> Self {
        let config = PlaywrightConfig::from_settings(&settings.ui);
        Self::with_playwright(settings, config)
    }

    pub fn with_playwright(settings: Arc<Settings>, config: PlaywrightConfig) -> Self {
        Self {
            settings,
            pages: PageSource::Playwright {
                config,
                browser: OnceCell::new(),
            },
            api: OnceCell::new(),
            log: logging::logger("Fixtures"),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_fake_pages(settings: Arc<Settings>, factory: PageFactory) -> Self {
        Self {
            settings,
            pages: PageSource::Fake(factory),
            api: OnceCell::new(),
            log: logging::logger("Fixtures"),
        }
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Airport data the API scenarios check against
    pub fn airports(&self) -> &AirportData {
        &self.settings.airports
    }

    /// The session browser, launched on first call
    pub async fn browser(&self) -> E2eResult<&PlaywrightHandle> {
        match &self.pages {
            PageSource::Playwright { config, browser } => {
                browser
                    .get_or_try_init(|| async {
                        let handle = PlaywrightHandle::launch(config.clone()).await?;
                        info!(
                            logger = %self.log,
                            "Launched {} browser headless={} slow_mo={}ms",
                            config.browser,
                            config.headless,
                            config.slow_mo_ms
                        );
                        Ok::<_, E2eError>(handle)
                    })
                    .await
            }
            #[cfg(test)]
            PageSource::Fake(_) => Err(E2eError::Fixture(
                "fake page source has no browser".to_string(),
            )),
        }
    }

    /// Fresh context and page for one test
    pub async fn new_page(&self) -> E2eResult<TestPage> {
        match &self.pages {
            PageSource::Playwright { .. } => {
                let context = self.browser().await?.new_context().await?;
                let page = match context.new_page().await {
                    Ok(page) => page,
                    Err(e) => {
                        if let Err(close_err) = context.close().await {
                            warn!(logger = %self.log, "Failed to close context: {}", close_err);
                        }
                        return Err(e);
                    }
                };
                Ok(TestPage {
                    page: Arc::new(page),
                    context: Some(context),
                })
            }
            #[cfg(test)]
            PageSource::Fake(factory) => Ok(TestPage {
                page: factory(),
                context: None,
            }),
        }
    }

    /// The shared API request context
    pub async fn api(&self) -> E2eResult<Arc<AirportGapClient>> {
        let client = self
            .api
            .get_or_try_init(|| async {
                AirportGapClient::new(&self.settings.api).map(Arc::new)
            })
            .await?;
        Ok(client.clone())
    }

    /// Close the browser and dispose of the API client
    ///
    /// Both are attempted even if one fails; the first error is returned.
    pub async fn teardown(self) -> E2eResult<()> {
        let mut first_error = None;

        match self.pages {
            PageSource::Playwright { browser, .. } => {
                if let Some(handle) = browser.into_inner() {
                    match handle.close().await {
                        Ok(()) => info!(logger = %self.log, "Browser closed"),
                        Err(e) => {
                            warn!(logger = %self.log, "Browser close failed: {}", e);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
            #[cfg(test)]
            PageSource::Fake(_) => {}
        }

        if let Some(api) = self.api.into_inner() {
            api.dispose();
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
