//! Cart commands.

use freshbasket_client::api::CartSnapshot;
use freshbasket_client::cart::CartViewModel;
use freshbasket_core::{CartItemId, ProductId};

use super::Context;

fn render(snapshot: &CartSnapshot) {
    if snapshot.items.is_empty() {
        tracing::info!("Your cart is empty");
        return;
    }

    for line in &snapshot.items {
        tracing::info!(
            "  [{}] {} x{} @ ₹{} = ₹{}",
            line.id,
            line.product.title,
            line.quantity,
            line.price_snapshot,
            line.line_total
        );
    }
    tracing::info!("  Total: ₹{}", snapshot.total);
    if !snapshot.savings.is_zero() {
        tracing::info!("  Savings: ₹{}", snapshot.savings);
    }
}

/// Show the current cart.
pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    let snapshot = cart.fetch().await?;
    render(&snapshot);
    Ok(())
}

/// Add a product to the cart.
pub async fn add(product: i32, quantity: u32) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    let snapshot = cart.add_item(ProductId::new(product), quantity).await?;
    render(&snapshot);
    Ok(())
}

/// Apply a quantity delta to a cart line.
pub async fn change_quantity(item: i32, delta: i32) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    // The delta applies to the line as currently held by the server
    cart.fetch().await?;
    let snapshot = cart.change_quantity(CartItemId::new(item), delta).await?;
    render(&snapshot);
    Ok(())
}

/// Remove a cart line.
pub async fn remove(item: i32) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    cart.fetch().await?;
    let snapshot = cart.remove_item(CartItemId::new(item)).await?;
    render(&snapshot);
    Ok(())
}

/// Move a cart line to the saved-for-later list.
pub async fn save_for_later(item: i32) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    cart.fetch().await?;
    let snapshot = cart
        .save_for_later(CartItemId::new(item), &ctx.wishlist)
        .await?;
    render(&snapshot);
    Ok(())
}

/// Move a saved product back into the cart.
pub async fn move_to_cart(product: i32) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;
    let cart = CartViewModel::new(ctx.api);

    let snapshot = cart
        .move_to_cart(&ctx.wishlist, ProductId::new(product))
        .await?;
    render(&snapshot);
    Ok(())
}

/// List saved-for-later products.
pub fn saved() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let entries = ctx.wishlist.entries();
    if entries.is_empty() {
        tracing::info!("No saved items");
        return Ok(());
    }

    for entry in entries {
        tracing::info!("  [{}] {} - ₹{}", entry.product_id, entry.title, entry.price);
    }
    Ok(())
}
