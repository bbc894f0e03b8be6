//! SauceDemo product listing
//!
//! Selectors use the `data-test` attributes the storefront ships with. Every
//! cart operation re-queries the live page before acting, since adding an
//! item swaps its "add" button for a "remove" one.

use std::sync::Arc;

use tracing::info;

use storefront_common::Settings;

use crate::driver::PageDriver;
use crate::ensure_that;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::pages::BasePage;
use crate::wait::poll_value;

pub struct InventoryPage {
    base: BasePage,
}

impl InventoryPage {
    pub const URL_FRAGMENT: &'static str = "/inventory.html";

    pub const INVENTORY_ITEM: &'static str = r#"[data-test="inventory-item"]"#;
    pub const INVENTORY_LIST: &'static str = r#"[data-test="inventory-list"]"#;
    pub const ITEM_NAME: &'static str = r#"[data-test="inventory-item-name"]"#;
    pub const ITEM_PRICE: &'static str = r#"[data-test="inventory-item-price"]"#;
    pub const ADD_TO_CART_BTNS: &'static str = r#"button[data-test^="add-to-cart-"]"#;
    pub const REMOVE_BTNS: &'static str = r#"button[data-test^="remove-"]"#;
    pub const CART_BADGE: &'static str = ".shopping_cart_badge";

    pub fn new(page: Arc<dyn PageDriver>, settings: &Settings) -> Self {
        Self {
            base: BasePage::new(page, "InventoryPage").with_expect_timeout(settings.ui.timeout()),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub fn inventory_items(&self) -> Locator {
        self.base.locator(Self::INVENTORY_ITEM)
    }

    pub fn add_buttons(&self) -> Locator {
        self.base.locator(Self::ADD_TO_CART_BTNS)
    }

    pub fn cart_badge(&self) -> Locator {
        self.base.locator(Self::CART_BADGE)
    }

    pub async fn add_first_item_to_cart(&self) -> E2eResult<&Self> {
        info!(logger = %self.base.logger(), "Adding first item to cart");
        self.base.click(self.add_buttons().first(), false).await?;
        Ok(self)
    }

    /// Add up to `number` items, returning how many were actually added
    ///
    /// Asking for more than the page offers is not an error.
    pub async fn add_items_to_cart(&self, number: usize) -> E2eResult<usize> {
        let available = self.base.count(self.add_buttons()).await?;
        info!(
            logger = %self.base.logger(),
            "Requested to add {} items, available add buttons: {}. Will add {}.",
            number,
            available,
            number.min(available)
        );

        let mut added = 0;
        while added < number {
            if self.base.count(self.add_buttons()).await? == 0 {
                break;
            }
            self.base.click(self.add_buttons().first(), false).await?;
            added += 1;
        }

        info!(logger = %self.base.logger(), "Added {} items to cart", added);
        Ok(added)
    }

    /// Click "add" until none are left
    pub async fn add_all_items_to_cart(&self) -> E2eResult<usize> {
        let mut added = 0;
        while self.base.count(self.add_buttons()).await? > 0 {
            self.base.click(self.add_buttons().first(), false).await?;
            added += 1;
        }
        info!(logger = %self.base.logger(), "All items added. Total={}", added);
        Ok(added)
    }

    pub async fn get_all_item_names(&self) -> E2eResult<Vec<String>> {
        let names = self.base.get_all_texts(Self::ITEM_NAME).await?;
        info!(logger = %self.base.logger(), "Collected item names: {:?}", names);
        Ok(names)
    }

    pub async fn get_all_prices(&self) -> E2eResult<Vec<String>> {
        let prices = self.base.get_all_texts(Self::ITEM_PRICE).await?;
        info!(logger = %self.base.logger(), "Collected item prices: {:?}", prices);
        Ok(prices)
    }

    pub async fn assert_items_count(&self, expected: usize) -> E2eResult<&Self> {
        self.base
            .expect_count(self.inventory_items(), expected, None)
            .await?;
        Ok(self)
    }

    /// Wait for the browser to land on the inventory URL
    pub async fn assert_loaded(&self) -> E2eResult<&Self> {
        let page = self.base.driver();
        poll_value(
            &format!("URL containing {}", Self::URL_FRAGMENT),
            self.base.expect_timeout(),
            || page.url(),
            |url| url.contains(Self::URL_FRAGMENT),
        )
        .await?;
        Ok(self)
    }

    /// Check the cart badge; an absent badge means an empty cart
    pub async fn assert_cart_count(&self, expected: usize) -> E2eResult<&Self> {
        if expected == 0 {
            let actual = if self.base.is_visible(self.cart_badge()).await? {
                self.badge_value().await?
            } else {
                "0".to_string()
            };
            ensure_that!(
                actual == "0",
                "Expected empty cart (0) but badge showed {}",
                actual
            );
            info!(logger = %self.base.logger(), "Cart is empty as expected");
            return Ok(self);
        }

        self.base.expect_visible(self.cart_badge(), None).await?;
        let actual = self.badge_value().await?;
        ensure_that!(
            actual == expected.to_string(),
            "Cart badge expected {} got {}",
            expected,
            actual
        );
        Ok(self)
    }

    async fn badge_value(&self) -> E2eResult<String> {
        let text = self.base.get_text(self.cart_badge()).await?;
        match text.parse::<usize>() {
            Ok(n) => Ok(n.to_string()),
            Err(_) => Err(E2eError::AssertionFailed(format!(
                "Cart badge shows non-numeric text '{}'",
                text
            ))),
        }
    }
}
