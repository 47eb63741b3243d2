//! Order history command.

use freshbasket_core::{CurrencyCode, Money};

use super::Context;

/// List the account's orders.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let orders = ctx.api.orders().await?;
    if orders.is_empty() {
        tracing::info!("No orders yet");
        return Ok(());
    }

    for order in orders {
        let total = Money::new(order.price, CurrencyCode::INR);
        tracing::info!(
            "  {} | {} | {:?} | {} | {}",
            order.invoice_no,
            order.order_date.format("%Y-%m-%d %H:%M"),
            order.order_status,
            total.display(),
            if order.paid_status { "paid" } else { "unpaid" }
        );
    }
    Ok(())
}
