//! Local-only "saved for later" wishlist.
//!
//! A best-effort mirror with no server of record: entries live in the local
//! store until moved back to the cart or explicitly removed. Keyed by
//! product id; saving an already-saved product is a no-op.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use freshbasket_core::ProductId;

use crate::api::types::{CartLine, amount};
use crate::store::{LocalStore, StoreError, keys};

/// A saved-for-later product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(with = "amount")]
    pub price: Decimal,
}

impl From<&CartLine> for WishlistEntry {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            title: line.product.title.clone(),
            image: line.product.image.clone(),
            price: line.product.price,
        }
    }
}

/// Client-held wishlist cache.
#[derive(Clone)]
pub struct WishlistCache {
    store: LocalStore,
}

impl WishlistCache {
    /// Create a wishlist over the given local store.
    #[must_use]
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// All saved entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.store
            .get::<Vec<WishlistEntry>>(keys::SAVED_ITEMS)
            .unwrap_or_default()
    }

    /// Whether a product is saved.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.entries().iter().any(|e| e.product_id == product_id)
    }

    /// Save an entry. Idempotent: an already-saved product id is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn save(&self, entry: WishlistEntry) -> Result<(), StoreError> {
        let mut entries = self.entries();
        if entries.iter().any(|e| e.product_id == entry.product_id) {
            return Ok(());
        }
        entries.push(entry);
        self.store.set(keys::SAVED_ITEMS, &entries)
    }

    /// Remove a saved product. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn remove(&self, product_id: ProductId) -> Result<(), StoreError> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.product_id != product_id);
        if entries.len() == before {
            return Ok(());
        }
        self.store.set(keys::SAVED_ITEMS, &entries)
    }
}
