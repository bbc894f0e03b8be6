//! Airport Gap scenarios

use futures::future::BoxFuture;
use tracing::{error, info};

use storefront_e2e::api::{AirportList, AIRPORTS_PATH};
use storefront_e2e::{ensure_that, E2eResult, ScenarioContext};

pub fn airport_count_is_30(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let log = ctx.logger();

        let response = ctx.api()?.get(AIRPORTS_PATH).await?;
        info!(logger = %log, "Request URL: {}", response.url);
        info!(logger = %log, "Response status: {}", response.status);

        let list: AirportList = response.ensure_ok()?.json()?;
        let count = list.data.len();
        info!(logger = %log, "Found {} airports in response", count);

        ensure_that!(count == 30, "Expected 30 airports, but found {}", count);
        Ok(())
    })
}

pub fn specific_airports_present(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let log = ctx.logger();
        let expected = &ctx.airports().expected_airports;
        info!(logger = %log, "Looking for airports: {:?}", expected);

        let list = ctx.api()?.list_airports().await?;
        let missing = list.missing(expected);
        if missing.is_empty() {
            info!(logger = %log, "All expected airports found: {:?}", expected);
        } else {
            error!(logger = %log, "Missing required airports: {:?}", missing);
            let mut available = list.names();
            available.sort_unstable();
            info!(logger = %log, "Available airports: {:?}", available);
        }

        ensure_that!(missing.is_empty(), "Missing required airports: {:?}", missing);
        Ok(())
    })
}

pub fn distance_between_airports_greater_than_400_km(
    ctx: &ScenarioContext,
) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let log = ctx.logger();
        let airports = ctx.airports();
        info!(
            logger = %log,
            "Calculating distance from {} to {}",
            airports.distance_from,
            airports.distance_to
        );

        let distance = ctx
            .api()?
            .distance(&airports.distance_from, &airports.distance_to)
            .await?;
        let km = distance.kilometers();
        info!(logger = %log, "Distance calculated: {} km", km);

        ensure_that!(km > 400.0, "Expected distance > 400 km, but got {}", km);
        Ok(())
    })
}
