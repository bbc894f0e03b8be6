//! In-memory storefront used by page-object and runner tests
//!
//! Models the login form and the inventory page closely enough for the page
//! objects: six products, add/remove buttons that swap as the cart fills, and
//! a cart badge that is absent while the cart is empty.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::driver::PageDriver;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::pages::{InventoryPage, LoginPage};

pub(crate) const BASE_URL: &str = "https://www.saucedemo.com";

pub(crate) const PRODUCTS: [(&str, &str); 6] = [
    ("Sauce Labs Backpack", "$29.99"),
    ("Sauce Labs Bike Light", "$9.99"),
    ("Sauce Labs Bolt T-Shirt", "$15.99"),
    ("Sauce Labs Fleece Jacket", "$49.99"),
    ("Sauce Labs Onesie", "$7.99"),
    ("Test.allTheThings() T-Shirt (Red)", "$15.99"),
];

const LEGACY_ITEM: &str = ".inventory_item";

#[derive(Default)]
struct State {
    url: String,
    fields: HashMap<String, String>,
    cart: BTreeSet<usize>,
    error: Option<String>,
    actions: Vec<String>,
    screenshots: Vec<PathBuf>,
    queries: usize,
    inventory_delay: usize,
    zero_badge: bool,
    broken_clicks: bool,
}

impl State {
    fn on_login(&self) -> bool {
        self.url.trim_end_matches('/') == BASE_URL
    }

    fn on_inventory(&self) -> bool {
        self.url.ends_with(InventoryPage::URL_FRAGMENT)
    }

    fn available(&self) -> Vec<usize> {
        (0..PRODUCTS.len()).filter(|i| !self.cart.contains(i)).collect()
    }

    fn count(&mut self, selector: &str) -> usize {
        let inventory = self.on_inventory();
        match selector {
            LoginPage::USERNAME_INPUT | LoginPage::PASSWORD_INPUT | LoginPage::LOGIN_BUTTON => {
                usize::from(self.on_login())
            }
            LoginPage::ERROR_MESSAGE => usize::from(self.on_login() && self.error.is_some()),
            InventoryPage::INVENTORY_ITEM | LEGACY_ITEM if inventory => {
                if self.inventory_delay > 0 {
                    self.inventory_delay -= 1;
                    0
                } else {
                    PRODUCTS.len()
                }
            }
            InventoryPage::ITEM_NAME | InventoryPage::ITEM_PRICE if inventory => PRODUCTS.len(),
            InventoryPage::INVENTORY_LIST if inventory => 1,
            InventoryPage::ADD_TO_CART_BTNS if inventory => self.available().len(),
            InventoryPage::REMOVE_BTNS if inventory => self.cart.len(),
            InventoryPage::CART_BADGE if inventory => {
                usize::from(!self.cart.is_empty() || self.zero_badge)
            }
            _ => 0,
        }
    }

    /// Index of the single element `locator` addresses, if it exists
    fn resolve(&mut self, locator: &Locator, command: &str) -> E2eResult<Option<usize>> {
        let selector = match locator.selector() {
            Some(selector) => selector,
            None => return Ok(None),
        };
        let count = self.count(selector);
        match locator.index() {
            Some(i) if i < count => Ok(Some(i)),
            Some(_) => Ok(None),
            None if count > 1 => Err(E2eError::Driver {
                command: command.to_string(),
                message: format!(
                    "strict mode violation: {} resolved to {} elements",
                    locator, count
                ),
            }),
            None if count == 1 => Ok(Some(0)),
            None => Ok(None),
        }
    }

    fn require(&mut self, locator: &Locator, command: &str) -> E2eResult<usize> {
        self.resolve(locator, command)?.ok_or_else(|| E2eError::Driver {
            command: command.to_string(),
            message: format!("Timeout 10000ms exceeded waiting for {}", locator),
        })
    }

    fn submit_login(&mut self) {
        let username = self.fields.get(LoginPage::USERNAME_INPUT).cloned().unwrap_or_default();
        let password = self.fields.get(LoginPage::PASSWORD_INPUT).cloned().unwrap_or_default();

        self.error = match (username.as_str(), password.as_str()) {
            ("", _) => Some("Epic sadface: Username is required".to_string()),
            (_, "") => Some("Epic sadface: Password is required".to_string()),
            ("locked_out_user", "secret_sauce") => {
                Some("Epic sadface: Sorry, this user has been locked out.".to_string())
            }
            ("standard_user" | "problem_user" | "visual_user", "secret_sauce") => None,
            _ => Some(
                "Epic sadface: Username and password do not match any user in this service"
                    .to_string(),
            ),
        };

        if self.error.is_none() {
            self.url = format!("{}{}", BASE_URL, InventoryPage::URL_FRAGMENT);
        }
    }
}

pub(crate) struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    /// A blank tab
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                url: "about:blank".to_string(),
                ..Default::default()
            }),
        })
    }

    /// A tab showing the login form
    pub(crate) fn login_form() -> Arc<Self> {
        let store = Self::new();
        store.state().url = BASE_URL.to_string();
        store
    }

    /// A tab already showing the inventory of a signed-in user
    pub(crate) fn logged_in() -> Arc<Self> {
        let store = Self::new();
        store.state().url = format!("{}{}", BASE_URL, InventoryPage::URL_FRAGMENT);
        store
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, action: String) {
        self.state().actions.push(action);
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    pub(crate) fn field(&self, selector: &str) -> Option<String> {
        self.state().fields.get(selector).cloned()
    }

    pub(crate) fn screenshots(&self) -> Vec<PathBuf> {
        self.state().screenshots.clone()
    }

    pub(crate) fn queries(&self) -> usize {
        self.state().queries
    }

    pub(crate) fn cart_len(&self) -> usize {
        self.state().cart.len()
    }

    /// Report an empty inventory for the next `probes` item counts
    pub(crate) fn delay_inventory(&self, probes: usize) {
        self.state().inventory_delay = probes;
    }

    /// Render an empty cart as a visible "0" badge
    pub(crate) fn show_zero_badge(&self) {
        self.state().zero_badge = true;
    }

    /// Put items in the cart without clicking
    pub(crate) fn preload_cart(&self, items: usize) {
        let mut state = self.state();
        state.cart = (0..items.min(PRODUCTS.len())).collect();
    }

    /// Make every click fail like a detached element
    pub(crate) fn break_clicks(&self) {
        self.state().broken_clicks = true;
    }
}

#[async_trait]
impl PageDriver for FakeStore {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state();
        state.queries += 1;
        if url.contains(".invalid") {
            return Err(E2eError::Driver {
                command: "goto".to_string(),
                message: format!("net::ERR_NAME_NOT_RESOLVED at {}", url),
            });
        }
        state.url = url.to_string();
        state.fields.clear();
        state.error = None;
        Ok(())
    }

    async fn reload(&self) -> E2eResult<()> {
        let mut state = self.state();
        state.queries += 1;
        state.fields.clear();
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        let mut state = self.state();
        state.queries += 1;
        Ok(state.url.clone())
    }

    async fn click(&self, locator: &Locator, _force: bool) -> E2eResult<()> {
        let mut state = self.state();
        state.queries += 1;
        if state.broken_clicks {
            return Err(E2eError::Driver {
                command: "click".to_string(),
                message: "Element is not attached to the DOM".to_string(),
            });
        }
        let index = state.require(locator, "click")?;

        match locator.selector() {
            Some(InventoryPage::ADD_TO_CART_BTNS) => {
                let item = state.available()[index];
                state.cart.insert(item);
            }
            Some(InventoryPage::REMOVE_BTNS) => {
                let item = state.cart.iter().nth(index).copied();
                if let Some(item) = item {
                    state.cart.remove(&item);
                }
            }
            Some(LoginPage::LOGIN_BUTTON) => state.submit_login(),
            _ => {}
        }
        state.actions.push(format!("click {}", locator));
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        {
            let mut state = self.state();
            state.queries += 1;
            state.require(locator, "fill")?;
            let selector = locator.selector().unwrap_or_default().to_string();
            state.fields.insert(selector, value.to_string());
        }
        self.record(format!("fill {}={}", locator.selector().unwrap_or_default(), value));
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str, _delay: Duration) -> E2eResult<()> {
        let mut state = self.state();
        state.queries += 1;
        state.require(locator, "type")?;
        let selector = locator.selector().unwrap_or_default().to_string();
        state.fields.entry(selector.clone()).or_default().push_str(text);
        state.actions.push(format!("type {}={}", selector, text));
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let mut state = self.state();
        state.queries += 1;
        let index = state.require(locator, "textContent")?;
        let text = match locator.selector() {
            Some(InventoryPage::CART_BADGE) => Some(state.cart.len().to_string()),
            Some(LoginPage::ERROR_MESSAGE) => state.error.clone(),
            Some(InventoryPage::ITEM_NAME) => Some(format!("\n  {}  ", PRODUCTS[index].0)),
            Some(InventoryPage::ITEM_PRICE) => Some(PRODUCTS[index].1.to_string()),
            _ => None,
        };
        Ok(text)
    }

    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let mut state = self.state();
        state.queries += 1;
        let selector = locator.selector().unwrap_or_default();
        if state.count(selector) == 0 {
            return Ok(Vec::new());
        }
        let texts = match selector {
            InventoryPage::ITEM_NAME => PRODUCTS.iter().map(|(n, _)| format!(" {} ", n)).collect(),
            InventoryPage::ITEM_PRICE => PRODUCTS.iter().map(|(_, p)| format!("{}\n", p)).collect(),
            _ => Vec::new(),
        };
        Ok(texts)
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let mut state = self.state();
        state.queries += 1;
        let selector = locator.selector().unwrap_or_default();
        let count = state.count(selector);
        Ok(count > locator.index().unwrap_or(0))
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let mut state = self.state();
        state.queries += 1;
        let selector = locator.selector().unwrap_or_default();
        Ok(state.count(selector))
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> E2eResult<()> {
        let mut state = self.state();
        state.queries += 1;
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }
}
