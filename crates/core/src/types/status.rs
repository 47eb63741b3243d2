//! Status and role enums shared across the client.
//!
//! Wire values are lowercase strings; unknown roles fall back to `Customer`
//! so a new server-side role never breaks deserialization of a login
//! response.

use serde::{Deserialize, Serialize};

/// Account role reported by the authentication API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Vendor managing their own listings.
    Vendor,
    /// Regular shopper. Catch-all for roles this client does not know.
    #[default]
    #[serde(other)]
    Customer,
}

impl Role {
    /// Post-login landing route for this role.
    ///
    /// The client never navigates on its own; it only computes the target
    /// for the view layer to act on.
    #[must_use]
    pub const fn landing_route(self) -> &'static str {
        match self {
            Self::Admin => "/admin/",
            Self::Vendor => "/vendors/",
            Self::Customer => "/",
        }
    }
}

/// Fulfillment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Online payment through the external gateway.
    Razorpay,
    /// Cash on delivery; no gateway handshake.
    Cod,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Razorpay => write!(f, "razorpay"),
            Self::Cod => write!(f, "cod"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").expect("parse"),
            Role::Admin
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"vendor\"").expect("parse"),
            Role::Vendor
        );
        // Unknown roles degrade to Customer instead of failing the response
        assert_eq!(
            serde_json::from_str::<Role>("\"warehouse\"").expect("parse"),
            Role::Customer
        );
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(Role::Admin.landing_route(), "/admin/");
        assert_eq!(Role::Vendor.landing_route(), "/vendors/");
        assert_eq!(Role::Customer.landing_route(), "/");
    }

    #[test]
    fn test_order_status_wire_values() {
        let status: OrderStatus = serde_json::from_str("\"processing\"").expect("parse");
        assert_eq!(status, OrderStatus::Processing);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).expect("serialize"),
            "\"delivered\""
        );
    }

    #[test]
    fn test_payment_method_display() {
        assert_eq!(PaymentMethod::Razorpay.to_string(), "razorpay");
        assert_eq!(PaymentMethod::Cod.to_string(), "cod");
    }
}
