//! SauceDemo login form

use std::sync::Arc;

use tracing::info;

use storefront_common::{Credentials, Settings};

use crate::driver::PageDriver;
use crate::error::E2eResult;
use crate::locator::Locator;
use crate::pages::BasePage;

pub struct LoginPage {
    base: BasePage,
    base_url: String,
    credentials: Credentials,
}

impl LoginPage {
    pub const USERNAME_INPUT: &'static str = "#user-name";
    pub const PASSWORD_INPUT: &'static str = "#password";
    pub const LOGIN_BUTTON: &'static str = "#login-button";
    pub const ERROR_MESSAGE: &'static str = r#"[data-test="error"]"#;

    pub fn new(page: Arc<dyn PageDriver>, settings: &Settings) -> Self {
        Self {
            base: BasePage::new(page, "LoginPage").with_expect_timeout(settings.ui.timeout()),
            base_url: settings.ui.base_url.clone(),
            credentials: settings.credentials.clone(),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub fn username_input(&self) -> Locator {
        self.base.locator(Self::USERNAME_INPUT)
    }

    pub fn password_input(&self) -> Locator {
        self.base.locator(Self::PASSWORD_INPUT)
    }

    pub fn login_button(&self) -> Locator {
        self.base.locator(Self::LOGIN_BUTTON)
    }

    pub fn error_banner(&self) -> Locator {
        self.base.locator(Self::ERROR_MESSAGE)
    }

    pub async fn open(&self) -> E2eResult<&Self> {
        self.base.goto(&self.base_url).await?;
        Ok(self)
    }

    /// Fill the form and submit it
    ///
    /// `None` falls back to the configured credentials; an explicit empty
    /// string is typed as-is. Whether the login worked is left to the caller.
    pub async fn login(&self, username: Option<&str>, password: Option<&str>) -> E2eResult<&Self> {
        let username = username.unwrap_or(&self.credentials.username);
        let password = password.unwrap_or(&self.credentials.password);

        info!(logger = %self.base.logger(), "Logging in as {}", username);
        self.base.fill(self.username_input(), username, true).await?;
        self.base.fill_secret(self.password_input(), password).await?;
        self.base.click(self.login_button(), false).await?;
        Ok(self)
    }

    /// Text of the error banner, once it is shown
    pub async fn error_message(&self) -> E2eResult<String> {
        let banner = self.base.expect_visible(self.error_banner(), None).await?;
        self.base.get_text(banner).await
    }

    pub async fn is_error_visible(&self) -> E2eResult<bool> {
        self.base.is_visible(self.error_banner()).await
    }
}
