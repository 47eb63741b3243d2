//! Typed client for the storefront REST API.
//!
//! # Architecture
//!
//! - The server is the source of truth - no local sync, direct API calls
//! - Every endpoint has an explicit schema in [`types`]; payloads that do
//!   not match are surfaced as [`ApiError::InvalidBody`]
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL)
//!
//! # Authentication
//!
//! Requests carry credentials according to the configured
//! [`AuthMode`](crate::config::AuthMode): a bearer token from the session
//! store, an `X-CSRFToken` header backed by a cookie session, or both. On a
//! 401/403 answer to an authenticated call the client silently refreshes the
//! access token once and retries the original call once; a second rejection
//! is surfaced to the caller. The client never navigates - redirect
//! decisions belong to the view layer.

mod cache;
pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use freshbasket_core::{CartItemId, OrderId, PaymentMethod, ProductId};

use crate::config::{AuthMode, StoreConfig};
use crate::session::SessionStore;
use crate::store::StoreError;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed.
    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body was not JSON, or did not match the endpoint schema.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// The server rejected the request.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Server-reported reason (the `detail` field when present).
        message: String,
    },

    /// The session could not be refreshed; full re-authentication required.
    #[error("Session refresh failed")]
    RefreshFailed,

    /// Locally persisted state could not be written.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Whether this error is an authentication rejection (401/403).
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }
}

/// Whether a failed authenticated call should trigger a silent refresh.
///
/// Exactly one refresh-and-retry per call: a second auth failure is
/// surfaced, never re-refreshed.
const fn should_refresh(authed: bool, already_retried: bool, error: &ApiError) -> bool {
    authed && !already_retried && error.is_auth_failure()
}

/// Client for the storefront REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool, the session
/// store, and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base URL without trailing slash; endpoint paths start with `/`.
    base: String,
    auth_mode: AuthMode,
    session: SessionStore,
    catalog_cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// Enables a cookie store when the auth mode relies on cookie sessions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig, session: SessionStore) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if config.auth_mode.uses_csrf() {
            builder = builder.cookie_store(true);
        }
        let http = builder.build().map_err(ApiError::Network)?;

        let catalog_cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base: config.base_url.as_str().trim_end_matches('/').to_string(),
                auth_mode: config.auth_mode,
                session,
                catalog_cache,
            }),
        })
    }

    /// The session store this client reads credentials from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Issue a request and return the raw success body, refreshing the
    /// session and retrying once on an auth rejection.
    async fn call_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<String, ApiError> {
        let mut retried = false;
        loop {
            match self.dispatch(method.clone(), path, body, authed).await {
                Ok(text) => return Ok(text),
                Err(e) if should_refresh(authed, retried, &e) => {
                    debug!(path, "Authentication rejected, attempting silent refresh");
                    Box::pin(self.refresh()).await?;
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Issue a request and decode the success body as `T`.
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<T, ApiError> {
        let text = self.call_raw(method, path, body, authed).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                path,
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Response did not match endpoint schema"
            );
            ApiError::InvalidBody(e.to_string())
        })
    }

    /// Issue a request and discard the success body (e.g. `DELETE` → 204).
    async fn call_no_content<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<(), ApiError> {
        self.call_raw(method, path, body, authed).await.map(|_| ())
    }

    /// Send a single request, without any retry.
    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.inner.base);
        let mut request = self.inner.http.request(method, url);

        if authed
            && self.inner.auth_mode.uses_bearer()
            && let Some(token) = self.inner.session.access_token()
        {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        // The CSRF header guards any mutating request in cookie mode, even
        // pre-login ones like signup and OTP.
        if self.inner.auth_mode.uses_csrf()
            && let Some(csrf) = self.inner.session.csrf_token()
        {
            request = request.header("X-CSRFToken", csrf);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(http_error(status.as_u16(), &text))
        }
    }

    // =========================================================================
    // Token refresh
    // =========================================================================

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Fail-closed: a server rejection of the refresh token clears BOTH
    /// tokens, forcing full re-authentication rather than repeated retry. A
    /// network failure is transient and leaves the stored tokens alone.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RefreshFailed` when no refresh token is stored or
    /// the server rejected it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let Some(refresh) = self.inner.session.refresh_token() else {
            return Err(ApiError::RefreshFailed);
        };

        let request = RefreshRequest {
            refresh: refresh.expose_secret(),
        };
        let result: Result<RefreshResponse, ApiError> = self
            .call(Method::POST, "/api/token/refresh/", Some(&request), false)
            .await;

        apply_refresh_outcome(&self.inner.session, result)
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest<'_>) -> Result<(), ApiError> {
        self.call_no_content(Method::POST, "/api/users/signup/", Some(request), false)
            .await
    }

    /// Request a one-time password for the given email.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn request_otp(&self, email: &str) -> Result<OtpResponse, ApiError> {
        self.call(
            Method::POST,
            "/api/users/request-otp/",
            Some(&OtpRequest { email }),
            false,
        )
        .await
    }

    /// Verify an OTP and obtain a token pair.
    ///
    /// Token storage is the caller's concern (see
    /// [`AuthService`](crate::auth::AuthService)); this method only performs
    /// the exchange.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the OTP is rejected.
    #[instrument(skip(self, otp), fields(email = %email))]
    pub async fn login(&self, email: &str, otp: &str) -> Result<LoginResponse, ApiError> {
        self.call(
            Method::POST,
            "/api/users/login/",
            Some(&LoginRequest { email, otp }),
            false,
        )
        .await
    }

    // =========================================================================
    // Catalog endpoints
    // =========================================================================

    /// List product categories (cached).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.catalog_cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let listing: Listing<Category> = self
            .call::<(), _>(Method::GET, "/api/categories/", None, false)
            .await?;
        let categories = listing.into_items();

        self.inner
            .catalog_cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List catalog products (cached).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.catalog_cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let listing: Listing<Product> = self
            .call::<(), _>(Method::GET, "/api/products/", None, false)
            .await?;
        let products = listing.into_items();

        self.inner
            .catalog_cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Cart endpoints
    // =========================================================================

    /// Fetch the current cart snapshot.
    ///
    /// Never cached: the snapshot is authoritative display state and is
    /// replaced wholesale by the caller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<CartSnapshot, ApiError> {
        self.call::<(), _>(Method::GET, "/api/cart/", None, true).await
    }

    /// Add a product to the cart.
    ///
    /// The response body is ignored; callers re-fetch the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.call_no_content(
            Method::POST,
            "/api/cart/",
            Some(&AddToCartRequest { product, quantity }),
            true,
        )
        .await
    }

    /// Set the absolute quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_item(
        &self,
        item: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.call_no_content(
            Method::PATCH,
            &format!("/api/cart/{item}/"),
            Some(&UpdateQuantityRequest { quantity }),
            true,
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        self.call_no_content::<()>(Method::DELETE, &format!("/api/cart/{item}/"), None, true)
            .await
    }

    // =========================================================================
    // Address endpoints
    // =========================================================================

    /// Save a delivery address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self, request))]
    pub async fn save_address(&self, request: &AddressRequest<'_>) -> Result<Address, ApiError> {
        self.call(Method::POST, "/api/addresses/", Some(request), true)
            .await
    }

    // =========================================================================
    // Checkout & payment endpoints
    // =========================================================================

    /// Create a checkout order from the current cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails (e.g. empty cart).
    #[instrument(skip(self))]
    pub async fn create_checkout_order(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOrder, ApiError> {
        self.call(
            Method::POST,
            "/api/checkout/",
            Some(&CheckoutRequest { payment_method }),
            true,
        )
        .await
    }

    /// Create a gateway order against an existing checkout order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn create_gateway_order(&self, order: OrderId) -> Result<GatewayOrder, ApiError> {
        self.call(
            Method::POST,
            "/api/payments/create-razorpay-order/",
            Some(&GatewayOrderRequest {
                order_id: order,
                method: PaymentMethod::Razorpay,
            }),
            true,
        )
        .await
    }

    /// Verify a completed gateway payment.
    ///
    /// Server-side verification is signature-based and safe to repeat with
    /// the same confirmation fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the signature is rejected.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id))]
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest<'_>,
    ) -> Result<(), ApiError> {
        self.call_no_content(
            Method::POST,
            "/api/payments/verify-razorpay-payment/",
            Some(request),
            true,
        )
        .await
    }

    // =========================================================================
    // Order endpoints
    // =========================================================================

    /// List the account's order history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        let listing: Listing<OrderSummary> = self
            .call::<(), _>(Method::GET, "/api/orders/", None, true)
            .await?;
        Ok(listing.into_items())
    }
}

/// Apply the result of a refresh call to the session.
///
/// A server rejection clears the whole session; a network failure leaves it
/// untouched for a later retry.
fn apply_refresh_outcome(
    session: &SessionStore,
    result: Result<RefreshResponse, ApiError>,
) -> Result<(), ApiError> {
    match result {
        Ok(response) => {
            session.set_access_token(&response.access)?;
            debug!("Access token refreshed");
            Ok(())
        }
        Err(e @ ApiError::Network(_)) => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Refresh token rejected, clearing session");
            session.clear()?;
            Err(ApiError::RefreshFailed)
        }
    }
}

/// Build an `ApiError::Http` from a failed response, extracting the
/// server's `detail` message when the body carries one.
fn http_error(status: u16, body: &str) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        detail: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .unwrap_or_else(|| body.chars().take(200).collect());

    ApiError::Http { status, message }
}
