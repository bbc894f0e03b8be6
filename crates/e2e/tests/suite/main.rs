//! Live E2E suite entry point
//!
//! Drives the real storefront and Airport Gap API.
//! Run with: cargo test --package storefront-e2e --features live --test suite -- --marker ui

mod api_airports;
mod ui_inventory;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use storefront_common::{logging, Settings};
use storefront_e2e::runner::RunnerConfig;
use storefront_e2e::{Fixtures, Marker, Scenario, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "storefront-e2e")]
#[command(about = "E2E suite for the SauceDemo storefront and the Airport Gap API")]
struct Args {
    /// Run only scenarios with this marker
    #[arg(short, long, value_enum)]
    marker: Option<Marker>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Directory for failure screenshots
    #[arg(long, default_value = "screenshots")]
    screenshots: PathBuf,

    /// Skip the screenshot taken when a UI scenario fails
    #[arg(long)]
    no_failure_screenshots: bool,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "inventory_page_has_six_items",
            Marker::Ui,
            ui_inventory::inventory_page_has_six_items,
        ),
        Scenario::new(
            "add_single_item_increments_cart",
            Marker::Ui,
            ui_inventory::add_single_item_increments_cart,
        ),
        Scenario::new(
            "add_all_items_results_in_cart_count_six",
            Marker::Ui,
            ui_inventory::add_all_items_results_in_cart_count_six,
        ),
        Scenario::new(
            "locked_out_user_sees_error",
            Marker::Ui,
            ui_inventory::locked_out_user_sees_error,
        ),
        Scenario::new(
            "airport_count_is_30",
            Marker::Api,
            api_airports::airport_count_is_30,
        ),
        Scenario::new(
            "specific_airports_present",
            Marker::Api,
            api_airports::specific_airports_present,
        ),
        Scenario::new(
            "distance_between_airports_greater_than_400_km",
            Marker::Api,
            api_airports::distance_between_airports_greater_than_400_km,
        ),
    ]
}

fn main() {
    let args = Args::parse();

    let code = match run(args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    logging::shutdown();
    std::process::exit(code);
}

fn run(args: Args) -> anyhow::Result<bool> {
    let settings = Settings::from_env().context("loading settings")?;
    let log_file = logging::init(&settings.logging).context("initialising logging")?;
    info!(logger = "Suite", "Run log: {}", log_file.display());

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(async_main(args, Arc::new(settings)))
}

async fn async_main(args: Args, settings: Arc<Settings>) -> anyhow::Result<bool> {
    let config = RunnerConfig {
        output_dir: args.output,
        screenshot_dir: args.screenshots,
        screenshot_on_failure: !args.no_failure_screenshots,
    };
    let runner = TestRunner::with_config(Fixtures::new(settings), scenarios(), config);

    if args.list {
        for scenario in runner.scenarios() {
            println!("{} [{}]", scenario.name, scenario.marker);
        }
        return Ok(true);
    }

    let selected = runner.select(args.marker, args.name.as_deref());
    if let (Some(name), true) = (&args.name, selected.is_empty()) {
        bail!("Test not found: {}", name);
    }

    let results = runner.run_scenarios(&selected).await;
    let written = runner.write_results(&results);

    // Session fixtures are released even when writing results failed.
    if let Err(e) = runner.teardown().await {
        warn!(logger = "Suite", "Teardown failed: {}", e);
    }
    written.context("writing results")?;

    Ok(results.success())
}
