//! Checkout orchestration: order → gateway order → payment widget → verify.
//!
//! One attempt walks `Idle → OrderCreated → GatewayOrderCreated →
//! AwaitingUserPayment → Verifying → Succeeded`, with `Failed` reachable
//! from every non-terminal state. Steps are strictly sequential; step *n+1*
//! is never issued before step *n*'s result is known. The hand-off to the
//! payment widget is the one suspension point with no client-owned timeout -
//! the user may abandon it entirely.
//!
//! Failures carry which step failed, because each implies a different
//! remedy: a rejected checkout order means retry checkout, a rejected
//! gateway order means retry payment, a rejected verification means the
//! money may have moved and support has to look. None of the steps is
//! compensated client-side; a gateway-order failure leaves the already
//! created checkout order in whatever state the server assigned it.
//!
//! An attempt is additionally persisted from order creation until a
//! terminal state, so a crash mid-payment can be reconciled against the
//! order history on the next start (see [`CheckoutOrchestrator::reconcile`]).

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use freshbasket_core::{OrderId, PaymentId, PaymentMethod};

use crate::api::{
    ApiClient, ApiError, CheckoutOrder, GatewayConfirmation, GatewayOrder, OrderSummary,
    VerifyPaymentRequest,
};
use crate::store::{LocalStore, StoreError, keys};

/// Route the view layer should navigate to after a successful checkout.
pub const ORDER_CONFIRMATION_ROUTE: &str = "/orders/";

/// States of one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// No attempt in progress.
    Idle,
    /// The merchant-side checkout order exists.
    OrderCreated,
    /// The gateway's own order exists; the widget can run.
    GatewayOrderCreated,
    /// Suspended on the external payment widget.
    AwaitingUserPayment,
    /// Widget completed; server-side verification in flight.
    Verifying,
    /// Terminal: the order is placed (and, for gateway payments, verified).
    Succeeded,
    /// Terminal: the attempt failed; a fresh attempt starts over at `Idle`.
    Failed,
}

/// Errors that can end a checkout attempt, keyed by the step that failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another attempt holds the pay action.
    #[error("Another checkout attempt is already in flight")]
    AttemptInProgress,

    /// Creating the checkout order failed; the cart is untouched.
    #[error("Order creation failed: {0}")]
    OrderCreation(#[source] ApiError),

    /// Creating the gateway order failed; the checkout order is left as the
    /// server assigned it.
    #[error("Gateway order creation failed: {0}")]
    GatewayOrder(#[source] ApiError),

    /// The payment widget was dismissed by the user.
    #[error("Payment cancelled by user")]
    UserCancelled,

    /// Verification failed after the widget completed.
    #[error("Payment verification failed: {0}")]
    Verification(#[source] ApiError),

    /// Reconciliation could not query the order history.
    #[error("Order reconciliation failed: {0}")]
    Reconcile(#[source] ApiError),

    /// The pending-attempt record could not be written.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Whether the view layer should block until the user acknowledges.
    ///
    /// Gateway and verification failures involve money that may already
    /// have moved; everything else is safe to show as a transient notice.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::GatewayOrder(_) | Self::Verification(_))
    }
}

/// The checkout-facing API operations.
///
/// A seam for tests: the state machine is exercised against scripted
/// implementations, the real client implements it by delegation.
#[allow(async_fn_in_trait)]
pub trait CheckoutApi {
    /// Create a checkout order from the current cart.
    async fn create_checkout_order(
        &self,
        method: PaymentMethod,
    ) -> Result<CheckoutOrder, ApiError>;
    /// Create a gateway order against a checkout order.
    async fn create_gateway_order(&self, order: OrderId) -> Result<GatewayOrder, ApiError>;
    /// Verify a completed gateway payment.
    async fn verify_payment(
        &self,
        payment: PaymentId,
        confirmation: &GatewayConfirmation,
    ) -> Result<(), ApiError>;
    /// List the order history (reconciliation).
    async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError>;
}

impl CheckoutApi for ApiClient {
    async fn create_checkout_order(
        &self,
        method: PaymentMethod,
    ) -> Result<CheckoutOrder, ApiError> {
        Self::create_checkout_order(self, method).await
    }

    async fn create_gateway_order(&self, order: OrderId) -> Result<GatewayOrder, ApiError> {
        Self::create_gateway_order(self, order).await
    }

    async fn verify_payment(
        &self,
        payment: PaymentId,
        confirmation: &GatewayConfirmation,
    ) -> Result<(), ApiError> {
        Self::verify_payment(
            self,
            &VerifyPaymentRequest {
                payment_id: payment,
                razorpay_payment_id: &confirmation.gateway_payment_id,
                razorpay_order_id: &confirmation.gateway_order_id,
                razorpay_signature: &confirmation.signature,
            },
        )
        .await
    }

    async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        Self::orders(self).await
    }
}

/// Outcome of the external payment widget.
#[derive(Debug, Clone)]
pub enum WidgetOutcome {
    /// The user completed payment; the gateway supplied correlation fields.
    Completed(GatewayConfirmation),
    /// The user dismissed the widget.
    Dismissed,
}

/// The externally controlled payment UI.
///
/// The orchestrator suspends on this with no timeout of its own; if the
/// future never resolves, the attempt stays `AwaitingUserPayment` in memory
/// only.
#[allow(async_fn_in_trait)]
pub trait PaymentWidget {
    /// Run the widget for the given gateway order and report how it ended.
    async fn collect_payment(&self, order: &GatewayOrder) -> WidgetOutcome;
}

/// A checkout attempt that was interrupted before reaching a terminal
/// state, persisted so the next start can reconcile it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub order_id: OrderId,
    pub invoice_no: String,
    /// Known once the gateway order was created.
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    pub method: PaymentMethod,
    pub started_at: DateTime<Utc>,
}

/// Result of reconciling a leftover [`PendingCheckout`] on startup.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// No interrupted attempt on record.
    Clean,
    /// The gateway completed the charge; the order is paid.
    Paid(OrderSummary),
    /// The order exists but was never paid.
    Unpaid(OrderSummary),
    /// The order history has no matching invoice.
    Unknown(PendingCheckout),
}

/// Successful end of a checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The placed checkout order.
    pub order: CheckoutOrder,
    /// Route the view layer should navigate to.
    pub redirect: &'static str,
}

/// Drives the multi-step checkout sequence.
pub struct CheckoutOrchestrator<A: CheckoutApi> {
    api: A,
    store: LocalStore,
    state: watch::Sender<CheckoutState>,
    /// Pay-action guard: held from entry into `OrderCreated` until a
    /// terminal state, so a double-click cannot create two orders.
    busy: AtomicBool,
}

impl<A: CheckoutApi> CheckoutOrchestrator<A> {
    /// Create an orchestrator in the `Idle` state.
    #[must_use]
    pub fn new(api: A, store: LocalStore) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            api,
            store,
            state,
            busy: AtomicBool::new(false),
        }
    }

    /// The current attempt state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: CheckoutState) {
        debug!(?state, "Checkout state transition");
        self.state.send_replace(state);
    }

    /// Run one checkout attempt to a terminal state.
    ///
    /// For `cod` the attempt ends at order creation; for the gateway path
    /// it walks the full order → gateway order → widget → verify sequence.
    /// A failed or cancelled attempt is not resumed - the next call starts
    /// over with a new checkout order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AttemptInProgress` when another attempt is
    /// running, otherwise the step-specific error that ended the attempt.
    #[instrument(skip(self, widget), fields(attempt = %Uuid::new_v4(), %method))]
    pub async fn pay<W: PaymentWidget>(
        &self,
        method: PaymentMethod,
        widget: &W,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::AttemptInProgress);
        }

        let result = self.run_attempt(method, widget).await;

        match &result {
            Ok(_) => self.set_state(CheckoutState::Succeeded),
            Err(e) => {
                warn!(error = %e, "Checkout attempt failed");
                self.set_state(CheckoutState::Failed);
            }
        }

        // Terminal either way: drop the pending record and release the pay
        // action for a fresh attempt. A failed cleanup is only logged - the
        // stale record resolves through reconcile() on the next start.
        if let Err(e) = self.store.remove(keys::PENDING_CHECKOUT) {
            warn!(error = %e, "Failed to clear pending checkout record");
        }
        self.busy.store(false, Ordering::Release);

        result
    }

    async fn run_attempt<W: PaymentWidget>(
        &self,
        method: PaymentMethod,
        widget: &W,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.set_state(CheckoutState::Idle);

        // Step 1: merchant-side checkout order. On failure the cart is
        // untouched - no optimistic mutation happened.
        let order = self
            .api
            .create_checkout_order(method)
            .await
            .map_err(CheckoutError::OrderCreation)?;
        self.set_state(CheckoutState::OrderCreated);

        // COD needs no gateway handshake.
        if method == PaymentMethod::Cod {
            return Ok(CheckoutOutcome {
                order,
                redirect: ORDER_CONFIRMATION_ROUTE,
            });
        }

        let mut pending = PendingCheckout {
            order_id: order.id,
            invoice_no: order.invoice_no.clone(),
            payment_id: None,
            method,
            started_at: Utc::now(),
        };
        self.store.set(keys::PENDING_CHECKOUT, &pending)?;

        // Step 2: gateway order. No compensating cancel exists for the
        // checkout order if this fails.
        let gateway = self
            .api
            .create_gateway_order(order.id)
            .await
            .map_err(CheckoutError::GatewayOrder)?;
        self.set_state(CheckoutState::GatewayOrderCreated);

        pending.payment_id = Some(gateway.payment_id);
        self.store.set(keys::PENDING_CHECKOUT, &pending)?;

        // Step 3: hand control to the external widget. No client-owned
        // timeout.
        self.set_state(CheckoutState::AwaitingUserPayment);
        let confirmation = match widget.collect_payment(&gateway).await {
            WidgetOutcome::Completed(confirmation) => confirmation,
            WidgetOutcome::Dismissed => return Err(CheckoutError::UserCancelled),
        };

        // Step 4: server-side verification. Any error here is terminal for
        // the attempt.
        self.set_state(CheckoutState::Verifying);
        self.api
            .verify_payment(gateway.payment_id, &confirmation)
            .await
            .map_err(CheckoutError::Verification)?;

        Ok(CheckoutOutcome {
            order,
            redirect: ORDER_CONFIRMATION_ROUTE,
        })
    }

    /// Resolve a checkout attempt that never reached a terminal state
    /// (e.g. the process died while the widget was open). Queries the
    /// order history and matches by invoice number; the pending record is
    /// cleared whatever the answer, since it is no longer actionable.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Reconcile` if the order history cannot be
    /// fetched; the pending record is kept for a later retry.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, CheckoutError> {
        let Some(pending) = self.store.get::<PendingCheckout>(keys::PENDING_CHECKOUT) else {
            return Ok(ReconcileOutcome::Clean);
        };

        let orders = self
            .api
            .orders()
            .await
            .map_err(CheckoutError::Reconcile)?;

        let outcome = orders
            .into_iter()
            .find(|o| o.invoice_no == pending.invoice_no)
            .map_or_else(
                || {
                    warn!(invoice_no = %pending.invoice_no, "Pending checkout has no matching order");
                    ReconcileOutcome::Unknown(pending.clone())
                },
                |order| {
                    if order.paid_status {
                        ReconcileOutcome::Paid(order)
                    } else {
                        ReconcileOutcome::Unpaid(order)
                    }
                },
            );

        self.store.remove(keys::PENDING_CHECKOUT)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    use freshbasket_core::{MinorUnits, OrderStatus};
    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use super::*;

    /// Scripted checkout API: results pop from per-endpoint queues, calls
    /// are recorded in order.
    #[derive(Clone, Default)]
    struct ScriptedApi {
        inner: Arc<ScriptedInner>,
    }

    #[derive(Default)]
    struct ScriptedInner {
        calls: Mutex<Vec<&'static str>>,
        checkout_orders: Mutex<VecDeque<Result<CheckoutOrder, ApiError>>>,
        gateway_orders: Mutex<VecDeque<Result<GatewayOrder, ApiError>>>,
        verifications: Mutex<VecDeque<Result<(), ApiError>>>,
        order_lists: Mutex<VecDeque<Result<Vec<OrderSummary>, ApiError>>>,
    }

    impl ScriptedApi {
        fn calls(&self) -> Vec<&'static str> {
            self.inner.calls.lock().expect("lock").clone()
        }

        fn push_checkout(&self, result: Result<CheckoutOrder, ApiError>) {
            self.inner
                .checkout_orders
                .lock()
                .expect("lock")
                .push_back(result);
        }

        fn push_gateway(&self, result: Result<GatewayOrder, ApiError>) {
            self.inner
                .gateway_orders
                .lock()
                .expect("lock")
                .push_back(result);
        }

        fn push_verify(&self, result: Result<(), ApiError>) {
            self.inner
                .verifications
                .lock()
                .expect("lock")
                .push_back(result);
        }

        fn push_orders(&self, result: Result<Vec<OrderSummary>, ApiError>) {
            self.inner
                .order_lists
                .lock()
                .expect("lock")
                .push_back(result);
        }
    }

    impl CheckoutApi for ScriptedApi {
        async fn create_checkout_order(
            &self,
            _method: PaymentMethod,
        ) -> Result<CheckoutOrder, ApiError> {
            self.inner.calls.lock().expect("lock").push("checkout");
            self.inner
                .checkout_orders
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected checkout call")
        }

        async fn create_gateway_order(
            &self,
            _order: OrderId,
        ) -> Result<GatewayOrder, ApiError> {
            self.inner.calls.lock().expect("lock").push("gateway");
            self.inner
                .gateway_orders
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected gateway call")
        }

        async fn verify_payment(
            &self,
            _payment: PaymentId,
            _confirmation: &GatewayConfirmation,
        ) -> Result<(), ApiError> {
            self.inner.calls.lock().expect("lock").push("verify");
            self.inner
                .verifications
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected verify call")
        }

        async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
            self.inner.calls.lock().expect("lock").push("orders");
            self.inner
                .order_lists
                .lock()
                .expect("lock")
                .pop_front()
                .expect("unexpected orders call")
        }
    }

    /// Widget that completes immediately, counting invocations.
    #[derive(Default)]
    struct CompletingWidget {
        invocations: AtomicUsize,
    }

    impl PaymentWidget for CompletingWidget {
        async fn collect_payment(&self, order: &GatewayOrder) -> WidgetOutcome {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            WidgetOutcome::Completed(GatewayConfirmation {
                gateway_payment_id: "pay_test".to_string(),
                gateway_order_id: order.gateway_order_id.clone(),
                signature: "sig_test".to_string(),
            })
        }
    }

    /// Widget the user dismisses.
    struct DismissingWidget;

    impl PaymentWidget for DismissingWidget {
        async fn collect_payment(&self, _order: &GatewayOrder) -> WidgetOutcome {
            WidgetOutcome::Dismissed
        }
    }

    /// Widget that parks until released, to hold an attempt in
    /// `AwaitingUserPayment`.
    struct ParkedWidget {
        release: Arc<Notify>,
    }

    impl PaymentWidget for ParkedWidget {
        async fn collect_payment(&self, _order: &GatewayOrder) -> WidgetOutcome {
            self.release.notified().await;
            WidgetOutcome::Dismissed
        }
    }

    fn order(id: i32) -> CheckoutOrder {
        CheckoutOrder {
            id: OrderId::new(id),
            invoice_no: format!("INV{id:08}"),
        }
    }

    fn gateway_order() -> GatewayOrder {
        GatewayOrder {
            payment_id: PaymentId::new(77),
            key_id: "rzp_test_key".to_string(),
            amount: MinorUnits::new(24_000),
            currency: "INR".to_string(),
            gateway_order_id: "order_abc123".to_string(),
        }
    }

    fn http_500() -> ApiError {
        ApiError::Http {
            status: 500,
            message: "server error".to_string(),
        }
    }

    fn order_summary(invoice_no: &str, paid: bool) -> OrderSummary {
        OrderSummary {
            invoice_no: invoice_no.to_string(),
            order_date: Utc::now(),
            order_status: OrderStatus::Processing,
            price: Decimal::new(24_000, 2),
            paid_status: paid,
        }
    }

    fn orchestrator(api: ScriptedApi) -> CheckoutOrchestrator<ScriptedApi> {
        CheckoutOrchestrator::new(api, LocalStore::in_memory())
    }

    #[tokio::test]
    async fn test_happy_path_calls_each_endpoint_once_in_order() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(1)));
        api.push_gateway(Ok(gateway_order()));
        api.push_verify(Ok(()));

        let orch = orchestrator(api.clone());
        let widget = CompletingWidget::default();

        let outcome = orch
            .pay(PaymentMethod::Razorpay, &widget)
            .await
            .expect("pay");

        assert_eq!(orch.state(), CheckoutState::Succeeded);
        assert_eq!(api.calls(), vec!["checkout", "gateway", "verify"]);
        assert_eq!(widget.invocations.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.redirect, ORDER_CONFIRMATION_ROUTE);
        assert_eq!(outcome.order.id, OrderId::new(1));
    }

    #[tokio::test]
    async fn test_cod_succeeds_without_gateway_handshake() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(2)));

        let orch = orchestrator(api.clone());
        let widget = CompletingWidget::default();

        orch.pay(PaymentMethod::Cod, &widget).await.expect("pay");

        assert_eq!(orch.state(), CheckoutState::Succeeded);
        assert_eq!(api.calls(), vec!["checkout"]);
        assert_eq!(widget.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_order_creation_failure_is_step_specific() {
        let api = ScriptedApi::default();
        api.push_checkout(Err(http_500()));

        let orch = orchestrator(api.clone());
        let result = orch.pay(PaymentMethod::Razorpay, &DismissingWidget).await;

        assert!(matches!(result, Err(CheckoutError::OrderCreation(_))));
        assert_eq!(orch.state(), CheckoutState::Failed);
        assert_eq!(api.calls(), vec!["checkout"]);
    }

    #[tokio::test]
    async fn test_gateway_failure_never_reaches_widget_or_verify() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(3)));
        api.push_gateway(Err(http_500()));

        let orch = orchestrator(api.clone());
        let widget = CompletingWidget::default();

        let result = orch.pay(PaymentMethod::Razorpay, &widget).await;

        assert!(matches!(result, Err(CheckoutError::GatewayOrder(_))));
        assert_eq!(orch.state(), CheckoutState::Failed);
        assert_eq!(api.calls(), vec!["checkout", "gateway"]);
        assert_eq!(widget.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dismissal_fails_attempt_and_next_attempt_is_fresh() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(4)));
        api.push_gateway(Ok(gateway_order()));
        // Second attempt gets a new order and succeeds
        api.push_checkout(Ok(order(5)));
        api.push_gateway(Ok(gateway_order()));
        api.push_verify(Ok(()));

        let orch = orchestrator(api.clone());

        let first = orch.pay(PaymentMethod::Razorpay, &DismissingWidget).await;
        assert!(matches!(first, Err(CheckoutError::UserCancelled)));
        assert_eq!(orch.state(), CheckoutState::Failed);

        let second = orch
            .pay(PaymentMethod::Razorpay, &CompletingWidget::default())
            .await
            .expect("second attempt");
        // A fresh checkout order, not a resumed one
        assert_eq!(second.order.id, OrderId::new(5));
        assert_eq!(
            api.calls(),
            vec!["checkout", "gateway", "checkout", "gateway", "verify"]
        );
    }

    #[tokio::test]
    async fn test_verification_failure_is_terminal() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(6)));
        api.push_gateway(Ok(gateway_order()));
        api.push_verify(Err(http_500()));

        let orch = orchestrator(api.clone());
        let result = orch
            .pay(PaymentMethod::Razorpay, &CompletingWidget::default())
            .await;

        assert!(matches!(result, Err(CheckoutError::Verification(_))));
        assert_eq!(orch.state(), CheckoutState::Failed);
        // Verify was attempted exactly once, never retried
        assert_eq!(api.calls(), vec!["checkout", "gateway", "verify"]);
    }

    #[tokio::test]
    async fn test_concurrent_pay_is_rejected() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(7)));
        api.push_gateway(Ok(gateway_order()));

        let release = Arc::new(Notify::new());
        let orch = Arc::new(orchestrator(api.clone()));

        let first = tokio::spawn({
            let orch = Arc::clone(&orch);
            let widget = ParkedWidget {
                release: Arc::clone(&release),
            };
            async move { orch.pay(PaymentMethod::Razorpay, &widget).await }
        });

        // Wait until the first attempt is suspended on the widget
        let mut states = orch.subscribe();
        states
            .wait_for(|s| *s == CheckoutState::AwaitingUserPayment)
            .await
            .expect("state");

        let second = orch
            .pay(PaymentMethod::Razorpay, &CompletingWidget::default())
            .await;
        assert!(matches!(second, Err(CheckoutError::AttemptInProgress)));
        // The guard rejected it before any network call
        assert_eq!(api.calls(), vec!["checkout", "gateway"]);

        release.notify_one();
        let first = first.await.expect("join");
        assert!(matches!(first, Err(CheckoutError::UserCancelled)));
    }

    #[tokio::test]
    async fn test_pending_record_lifecycle() {
        let api = ScriptedApi::default();
        api.push_checkout(Ok(order(8)));
        api.push_gateway(Ok(gateway_order()));
        api.push_verify(Ok(()));

        let store = LocalStore::in_memory();
        let orch = CheckoutOrchestrator::new(api, store.clone());

        orch.pay(PaymentMethod::Razorpay, &CompletingWidget::default())
            .await
            .expect("pay");

        // Terminal state clears the pending record
        assert!(store.get::<PendingCheckout>(keys::PENDING_CHECKOUT).is_none());
    }

    #[tokio::test]
    async fn test_reconcile_clean_without_record() {
        let orch = orchestrator(ScriptedApi::default());
        let outcome = orch.reconcile().await.expect("reconcile");
        assert!(matches!(outcome, ReconcileOutcome::Clean));
    }

    #[tokio::test]
    async fn test_reconcile_resolves_paid_order() {
        let api = ScriptedApi::default();
        api.push_orders(Ok(vec![
            order_summary("INV00000001", false),
            order_summary("INV00000009", true),
        ]));

        let store = LocalStore::in_memory();
        store
            .set(
                keys::PENDING_CHECKOUT,
                &PendingCheckout {
                    order_id: OrderId::new(9),
                    invoice_no: "INV00000009".to_string(),
                    payment_id: Some(PaymentId::new(77)),
                    method: PaymentMethod::Razorpay,
                    started_at: Utc::now(),
                },
            )
            .expect("seed");

        let orch = CheckoutOrchestrator::new(api, store.clone());
        let outcome = orch.reconcile().await.expect("reconcile");

        assert!(matches!(outcome, ReconcileOutcome::Paid(o) if o.invoice_no == "INV00000009"));
        assert!(store.get::<PendingCheckout>(keys::PENDING_CHECKOUT).is_none());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_record_when_history_unavailable() {
        let api = ScriptedApi::default();
        api.push_orders(Err(http_500()));

        let store = LocalStore::in_memory();
        let pending = PendingCheckout {
            order_id: OrderId::new(10),
            invoice_no: "INV00000010".to_string(),
            payment_id: None,
            method: PaymentMethod::Razorpay,
            started_at: Utc::now(),
        };
        store.set(keys::PENDING_CHECKOUT, &pending).expect("seed");

        let orch = CheckoutOrchestrator::new(api, store.clone());
        let result = orch.reconcile().await;

        assert!(matches!(result, Err(CheckoutError::Reconcile(_))));
        // Still on record for a later retry
        assert_eq!(
            store.get::<PendingCheckout>(keys::PENDING_CHECKOUT),
            Some(pending)
        );
    }

    #[test]
    fn test_blocking_severity() {
        assert!(CheckoutError::GatewayOrder(http_500()).is_blocking());
        assert!(CheckoutError::Verification(http_500()).is_blocking());
        assert!(!CheckoutError::OrderCreation(http_500()).is_blocking());
        assert!(!CheckoutError::UserCancelled.is_blocking());
        assert!(!CheckoutError::AttemptInProgress.is_blocking());
    }
}
