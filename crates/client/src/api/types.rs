//! Wire types for the storefront REST API.
//!
//! Every endpoint has an explicit request/response schema here; payloads
//! that do not match are rejected at the client boundary as
//! [`ApiError::InvalidBody`](super::ApiError) instead of being probed
//! field-by-field deep in calling code.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freshbasket_core::{
    AddressId, CartItemId, CategoryId, MinorUnits, OrderId, OrderStatus, PaymentId, PaymentMethod,
    ProductId, Role,
};

// =============================================================================
// Tolerant decimal fields
// =============================================================================

/// Serde helpers for decimal amounts the server may emit as either a JSON
/// string (`"19.99"`) or a bare number (`19.99`). Anything else fails
/// deserialization.
pub(crate) mod amount {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Decimal::from_str(&s)
                .map_err(|e| de::Error::custom(format!("invalid decimal string '{s}': {e}"))),
            Raw::Number(n) => Decimal::try_from(n)
                .map_err(|e| de::Error::custom(format!("invalid decimal number {n}: {e}"))),
        }
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

/// Like [`amount`], for optional fields (`old_price` may be null or absent).
pub(crate) mod amount_opt {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Text(s)) => Decimal::from_str(&s)
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid decimal string '{s}': {e}"))),
            Some(Raw::Number(n)) => Decimal::try_from(n)
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid decimal number {n}: {e}"))),
        }
    }

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::amount::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// List envelope
// =============================================================================

/// List endpoints answer either a paginated envelope (`{"results": [...]}`)
/// or a bare array, depending on deployment. Both documented shapes are
/// accepted; anything else is a schema violation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Paginated envelope.
    Paginated {
        /// Items on this page.
        results: Vec<T>,
    },
    /// Bare array.
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    /// Flatten into the contained items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results } => results,
            Self::Plain(items) => items,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Request body for account signup.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Request body for requesting a login OTP.
#[derive(Serialize)]
pub struct OtpRequest<'a> {
    pub email: &'a str,
}

/// Response from the OTP request endpoint.
#[derive(Debug, Deserialize)]
pub struct OtpResponse {
    /// Echoed OTP - dev-mode deployments only.
    #[serde(default)]
    pub otp: Option<String>,
}

/// Request body for OTP login.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// Token pair issued on successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    /// Account role; defaults to customer when the server omits it.
    #[serde(default)]
    pub role: Role,
}

/// Request body for the token refresh endpoint.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the token refresh endpoint.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}

/// A catalog product as referenced by listings and cart lines.
///
/// Immutable from the client's perspective; owned by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Image URL, when the catalog has one.
    #[serde(default)]
    pub image: Option<String>,
    /// Current price.
    #[serde(with = "amount")]
    pub price: Decimal,
    /// Pre-discount price, when the product is on offer.
    #[serde(default, with = "amount_opt")]
    pub old_price: Option<Decimal>,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the server-held cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
    /// Unit price captured when the line was created.
    #[serde(with = "amount")]
    pub price_snapshot: Decimal,
    /// Server-computed `price_snapshot * quantity`. Authoritative - the
    /// client never recomputes it.
    #[serde(with = "amount")]
    pub line_total: Decimal,
}

/// The server-held cart, replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartLine>,
    /// Server-computed cart total.
    #[serde(default, with = "amount")]
    pub total: Decimal,
    /// Server-computed discount total; zero when the server omits it.
    #[serde(default, with = "amount")]
    pub savings: Decimal,
}

impl CartSnapshot {
    /// Total item quantity across all lines (badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Find a line by its cart item id.
    #[must_use]
    pub fn line(&self, id: CartItemId) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == id)
    }
}

/// Request body for adding a product to the cart.
#[derive(Serialize)]
pub struct AddToCartRequest {
    pub product: ProductId,
    pub quantity: u32,
}

/// Request body for updating a cart line.
///
/// The quantity is absolute, not a delta: the update endpoint stores the
/// value it is given, so the client computes the clamped target quantity
/// and sends that.
#[derive(Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// =============================================================================
// Addresses
// =============================================================================

/// Request body for saving a delivery address.
#[derive(Debug, Serialize)]
pub struct AddressRequest<'a> {
    pub address: &'a str,
    pub pincode: &'a str,
    pub country: &'a str,
    /// Whether this is the active delivery address.
    pub status: bool,
}

/// A saved delivery address.
#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub address: String,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub status: bool,
}

// =============================================================================
// Checkout & payments
// =============================================================================

/// Request body for creating a checkout order from the current cart.
#[derive(Serialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
}

/// The merchant-side order created from the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub id: OrderId,
    pub invoice_no: String,
}

/// Request body for creating a gateway order against a checkout order.
#[derive(Serialize)]
pub struct GatewayOrderRequest {
    pub order_id: OrderId,
    pub method: PaymentMethod,
}

/// The payment gateway's own order, required before the payment widget can
/// run. `payment_id` is the merchant-side record correlating this attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub payment_id: PaymentId,
    /// Publishable gateway key for the widget.
    #[serde(rename = "razorpay_key_id")]
    pub key_id: String,
    /// Amount in minor currency units (paise).
    #[serde(rename = "razorpay_amount")]
    pub amount: MinorUnits,
    #[serde(rename = "razorpay_currency")]
    pub currency: String,
    /// The gateway's order id, passed to the widget and echoed back in the
    /// completion callback.
    #[serde(rename = "razorpay_order_id")]
    pub gateway_order_id: String,
}

/// Correlation fields returned by the payment widget on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfirmation {
    pub gateway_payment_id: String,
    pub gateway_order_id: String,
    pub signature: String,
}

/// Request body for server-side payment verification.
#[derive(Serialize)]
pub struct VerifyPaymentRequest<'a> {
    pub payment_id: PaymentId,
    pub razorpay_payment_id: &'a str,
    pub razorpay_order_id: &'a str,
    pub razorpay_signature: &'a str,
}

// =============================================================================
// Orders
// =============================================================================

/// One entry of the order history.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub invoice_no: String,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    #[serde(with = "amount")]
    pub price: Decimal,
    pub paid_status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_accepts_string_and_number() {
        let line: CartLine = serde_json::from_str(
            r#"{
                "id": 1,
                "product": {"id": 9, "title": "Tea", "image": null, "price": "120.00"},
                "quantity": 2,
                "price_snapshot": "120.00",
                "line_total": 240.0
            }"#,
        )
        .expect("parse");
        assert_eq!(line.price_snapshot.to_string(), "120.00");
        assert_eq!(line.line_total, Decimal::new(240, 0));
    }

    #[test]
    fn test_amount_rejects_other_types() {
        let result = serde_json::from_str::<Product>(
            r#"{"id": 1, "title": "Tea", "price": true}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cart_snapshot_defaults() {
        // Savings is frequently absent from the cart payload
        let snapshot: CartSnapshot =
            serde_json::from_str(r#"{"items": [], "total": "0.00"}"#).expect("parse");
        assert_eq!(snapshot.savings, Decimal::ZERO);
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"{
                "items": [
                    {"id": 1, "product": {"id": 1, "title": "A", "price": "5"},
                     "quantity": 2, "price_snapshot": "5", "line_total": "10"},
                    {"id": 2, "product": {"id": 2, "title": "B", "price": "3"},
                     "quantity": 3, "price_snapshot": "3", "line_total": "9"}
                ],
                "total": "19"
            }"#,
        )
        .expect("parse");
        assert_eq!(snapshot.item_count(), 5);
    }

    #[test]
    fn test_listing_accepts_both_shapes() {
        let paginated: Listing<Category> =
            serde_json::from_str(r#"{"results": [{"id": 1, "title": "Fruit"}]}"#).expect("parse");
        assert_eq!(paginated.into_items().len(), 1);

        let plain: Listing<Category> =
            serde_json::from_str(r#"[{"id": 1, "title": "Fruit"}, {"id": 2, "title": "Dairy"}]"#)
                .expect("parse");
        assert_eq!(plain.into_items().len(), 2);
    }

    #[test]
    fn test_gateway_order_wire_names() {
        let order: GatewayOrder = serde_json::from_str(
            r#"{
                "payment_id": 77,
                "razorpay_key_id": "rzp_test_key",
                "razorpay_amount": 24000,
                "razorpay_currency": "INR",
                "razorpay_order_id": "order_abc123"
            }"#,
        )
        .expect("parse");
        assert_eq!(order.payment_id, PaymentId::new(77));
        assert_eq!(order.amount.as_i64(), 24_000);
        assert_eq!(order.gateway_order_id, "order_abc123");
    }

    #[test]
    fn test_old_price_null_and_absent() {
        let with_null: Product =
            serde_json::from_str(r#"{"id": 1, "title": "A", "price": "5", "old_price": null}"#)
                .expect("parse");
        assert!(with_null.old_price.is_none());

        let absent: Product =
            serde_json::from_str(r#"{"id": 1, "title": "A", "price": "5"}"#).expect("parse");
        assert!(absent.old_price.is_none());

        let present: Product =
            serde_json::from_str(r#"{"id": 1, "title": "A", "price": "5", "old_price": "6.50"}"#)
                .expect("parse");
        assert_eq!(present.old_price.map(|p| p.to_string()), Some("6.50".into()));
    }
}
