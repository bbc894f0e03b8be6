//! Storefront scenarios

use futures::future::BoxFuture;
use tracing::info;

use storefront_e2e::{ensure_that, E2eResult, ScenarioContext};

pub fn inventory_page_has_six_items(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let log = ctx.logger();
        let credentials = &ctx.settings().credentials;

        info!(logger = %log, "Logging in with user: {}", credentials.username);
        ctx.login_page()?
            .open()
            .await?
            .login(
                Some(credentials.username.as_str()),
                Some(credentials.password.as_str()),
            )
            .await?;

        let inventory = ctx.inventory_page()?;
        inventory.assert_loaded().await?;
        inventory.assert_items_count(6).await?;

        let names = inventory.get_all_item_names().await?;
        ensure_that!(names.len() == 6, "Expected 6 item names, got {}", names.len());
        ensure_that!(
            names.iter().all(|n| !n.is_empty()),
            "Blank item name in {:?}",
            names
        );
        info!(logger = %log, "Found {} items as expected", names.len());
        Ok(())
    })
}

pub fn add_single_item_increments_cart(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        ctx.login_page()?.open().await?.login(None, None).await?;

        let inventory = ctx.inventory_page()?;
        inventory.assert_cart_count(0).await?;

        let added = inventory.add_items_to_cart(1).await?;
        ensure_that!(added == 1, "Expected to add 1 item, added {}", added);

        inventory.assert_cart_count(1).await?;
        info!(logger = %ctx.logger(), "Cart count correctly shows 1 item");
        Ok(())
    })
}

pub fn add_all_items_results_in_cart_count_six(
    ctx: &ScenarioContext,
) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        ctx.login_page()?.open().await?.login(None, None).await?;

        let inventory = ctx.inventory_page()?;
        inventory.assert_items_count(6).await?;

        let added = inventory.add_all_items_to_cart().await?;
        ensure_that!(added == 6, "Expected to add 6 items, added {}", added);

        inventory.assert_cart_count(6).await?;
        info!(logger = %ctx.logger(), "Cart count correctly shows 6 items");
        Ok(())
    })
}

pub fn locked_out_user_sees_error(ctx: &ScenarioContext) -> BoxFuture<'_, E2eResult<()>> {
    Box::pin(async move {
        let login = ctx.login_page()?;
        login.open().await?.login(Some("locked_out_user"), None).await?;

        let message = login.error_message().await?;
        ensure_that!(
            message.contains("locked out"),
            "Unexpected login error: '{}'",
            message
        );

        let url = login.base().current_url().await?;
        ensure_that!(
            !url.contains("/inventory.html"),
            "Locked out user reached {}",
            url
        );
        Ok(())
    })
}
