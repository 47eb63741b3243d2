//! Catalog browsing commands.

use super::Context;

/// List product categories.
pub async fn categories() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let categories = ctx.api.categories().await?;
    if categories.is_empty() {
        tracing::info!("No categories");
        return Ok(());
    }

    for category in categories {
        tracing::info!("  [{}] {}", category.id, category.title);
    }
    Ok(())
}

/// List products.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let products = ctx.api.products().await?;
    if products.is_empty() {
        tracing::info!("No products");
        return Ok(());
    }

    for product in products {
        match product.old_price {
            Some(old_price) => tracing::info!(
                "  [{}] {} - ₹{} (was ₹{old_price})",
                product.id,
                product.title,
                product.price
            ),
            None => tracing::info!("  [{}] {} - ₹{}", product.id, product.title, product.price),
        }
    }
    Ok(())
}
