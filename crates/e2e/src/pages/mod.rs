//! Page objects for the storefront

mod base;
mod inventory;
mod login;

#[cfg(test)]
pub(crate) mod fake;

pub use base::{BasePage, DEFAULT_EXPECT_TIMEOUT, SCREENSHOT_DIR};
pub use inventory::InventoryPage;
pub use login::LoginPage;
