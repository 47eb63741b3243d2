//! Checkout commands.
//!
//! The real deployment hands `AwaitingUserPayment` to the gateway's browser
//! widget. Here the widget is a terminal prompt: the gateway order details
//! are shown and the confirmation fields the gateway would pass to its
//! completion callback are read from stdin. An empty payment id dismisses,
//! like closing the widget.

use std::io::{BufRead, Write};

use freshbasket_client::api::{GatewayConfirmation, GatewayOrder};
use freshbasket_client::checkout::{
    CheckoutOrchestrator, PaymentWidget, ReconcileOutcome, WidgetOutcome,
};
use freshbasket_core::PaymentMethod;

use super::Context;

/// Terminal stand-in for the gateway's payment widget.
struct TerminalWidget;

impl TerminalWidget {
    fn prompt(label: &str) -> std::io::Result<String> {
        let mut out = std::io::stderr();
        write!(out, "{label}: ")?;
        out.flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl PaymentWidget for TerminalWidget {
    async fn collect_payment(&self, order: &GatewayOrder) -> WidgetOutcome {
        tracing::info!(
            "Gateway order {} for {} {} (key {})",
            order.gateway_order_id,
            order.amount.to_decimal(),
            order.currency,
            order.key_id
        );
        tracing::info!("Enter the gateway confirmation (empty payment id cancels)");

        let Ok(payment_id) = Self::prompt("gateway payment id") else {
            return WidgetOutcome::Dismissed;
        };
        if payment_id.is_empty() {
            return WidgetOutcome::Dismissed;
        }
        let Ok(signature) = Self::prompt("gateway signature") else {
            return WidgetOutcome::Dismissed;
        };

        WidgetOutcome::Completed(GatewayConfirmation {
            gateway_payment_id: payment_id,
            gateway_order_id: order.gateway_order_id.clone(),
            signature,
        })
    }
}

/// Errors specific to checkout commands.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutCommandError {
    /// Invalid payment method argument.
    #[error("Invalid payment method: {0}. Valid methods: razorpay, cod")]
    InvalidMethod(String),
}

fn parse_method(method: &str) -> Result<PaymentMethod, CheckoutCommandError> {
    match method {
        "razorpay" => Ok(PaymentMethod::Razorpay),
        "cod" => Ok(PaymentMethod::Cod),
        other => Err(CheckoutCommandError::InvalidMethod(other.to_string())),
    }
}

/// Run one checkout attempt.
pub async fn pay(method: &str) -> Result<(), Box<dyn std::error::Error>> {
    let method = parse_method(method)?;
    let ctx = Context::from_env()?;

    let orchestrator = CheckoutOrchestrator::new(ctx.api, ctx.store);
    let outcome = orchestrator.pay(method, &TerminalWidget).await?;

    tracing::info!(
        "Order placed: invoice {} (order id {})",
        outcome.order.invoice_no,
        outcome.order.id
    );
    tracing::info!("  Continue at: {}", outcome.redirect);
    Ok(())
}

/// Resolve a checkout attempt interrupted before a terminal state.
pub async fn reconcile() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    let orchestrator = CheckoutOrchestrator::new(ctx.api, ctx.store);
    match orchestrator.reconcile().await? {
        ReconcileOutcome::Clean => tracing::info!("No interrupted checkout on record"),
        ReconcileOutcome::Paid(order) => {
            tracing::info!(
                "Interrupted checkout {} completed on the gateway side - order is paid",
                order.invoice_no
            );
        }
        ReconcileOutcome::Unpaid(order) => {
            tracing::info!(
                "Interrupted checkout {} was never paid ({:?})",
                order.invoice_no,
                order.order_status
            );
        }
        ReconcileOutcome::Unknown(pending) => {
            tracing::warn!(
                "No order matches interrupted checkout {} (started {})",
                pending.invoice_no,
                pending.started_at
            );
        }
    }
    Ok(())
}
