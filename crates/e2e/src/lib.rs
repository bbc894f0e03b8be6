//! Storefront E2E Test Framework
//!
//! This crate drives the SauceDemo storefront through Playwright and the
//! Airport Gap API over HTTP:
//! - Keeps one Node/Playwright driver process alive for the whole run
//! - Wraps pages in logged page objects with bounded waits
//! - Shares a browser and an API request context across scenarios
//! - Runs marked scenarios sequentially and reports JSON results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 E2E Test Runner (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── Fixtures                                             │
//! │    │     ├── browser()  -> PlaywrightHandle (session)       │
//! │    │     ├── new_page() -> TestPage (per test)              │
//! │    │     └── api()      -> AirportGapClient (session)       │
//! │    ├── run_scenario(Scenario) -> TestResult                 │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects                                               │
//! │    BasePage ── goto, click, fill, get_text, expect_*        │
//! │      ├── LoginPage ── open, login, error_message            │
//! │      └── InventoryPage ── add_*_to_cart, assert_*           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PageDriver (trait) ◄── PlaywrightPage ── node driver.js    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod locator;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod wait;

pub use api::AirportGapClient;
pub use driver::PageDriver;
pub use error::{E2eError, E2eResult};
pub use fixtures::{Fixtures, TestPage};
pub use locator::{Locator, Target};
pub use pages::{BasePage, InventoryPage, LoginPage};
pub use runner::{Marker, Scenario, ScenarioContext, TestRunner};
