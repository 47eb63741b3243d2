//! Cart view-model: a server-authoritative snapshot with mutate-then-refetch.
//!
//! The snapshot is a cache, not a source of truth. Every mutating operation
//! is followed by a mandatory re-fetch; `total`, `savings`, and `line_total`
//! are never recomputed locally, so displayed and billed amounts cannot
//! drift. The snapshot is replaced atomically and published on a watch
//! channel for the view layer to subscribe to.

use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use freshbasket_core::{CartItemId, ProductId};

use crate::api::{ApiClient, ApiError, CartSnapshot};
use crate::store::StoreError;
use crate::wishlist::{WishlistCache, WishlistEntry};

/// Errors that can occur in cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The referenced line is not in the current snapshot.
    #[error("No cart line with id {0} in the current snapshot")]
    UnknownItem(CartItemId),

    /// Wishlist state could not be written.
    #[error("Local store error: {0}")]
    Store(#[from] StoreError),
}

/// The cart operations the view-model needs from the API.
///
/// A seam for tests: the view-model is exercised against scripted
/// implementations, the real client implements it by delegation.
#[allow(async_fn_in_trait)]
pub trait CartApi {
    /// Fetch the current cart snapshot.
    async fn fetch_cart(&self) -> Result<CartSnapshot, ApiError>;
    /// Add a product to the cart.
    async fn add_to_cart(&self, product: ProductId, quantity: u32) -> Result<(), ApiError>;
    /// Set the absolute quantity of a cart line.
    async fn update_cart_item(&self, item: CartItemId, quantity: u32) -> Result<(), ApiError>;
    /// Remove a cart line.
    async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError>;
}

impl CartApi for ApiClient {
    async fn fetch_cart(&self) -> Result<CartSnapshot, ApiError> {
        self.cart().await
    }

    async fn add_to_cart(&self, product: ProductId, quantity: u32) -> Result<(), ApiError> {
        Self::add_to_cart(self, product, quantity).await
    }

    async fn update_cart_item(&self, item: CartItemId, quantity: u32) -> Result<(), ApiError> {
        Self::update_cart_item(self, item, quantity).await
    }

    async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        Self::remove_cart_item(self, item).await
    }
}

/// Clamp a quantity change so the result never drops below 1.
///
/// Removal is a separate, explicit operation; the minus button bottoms out
/// at a quantity of one.
fn clamped_quantity(current: u32, delta: i32) -> u32 {
    let target = (i64::from(current) + i64::from(delta)).clamp(1, i64::from(u32::MAX));
    u32::try_from(target).map_or(u32::MAX, |q| q)
}

/// Holds the last-fetched cart snapshot and drives cart mutations.
pub struct CartViewModel<A: CartApi> {
    api: A,
    /// Current snapshot; `None` until the first successful fetch.
    snapshot: watch::Sender<Option<CartSnapshot>>,
}

impl<A: CartApi> CartViewModel<A> {
    /// Create a view-model with no snapshot yet.
    #[must_use]
    pub fn new(api: A) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self { api, snapshot }
    }

    /// The current snapshot, if one has been fetched.
    #[must_use]
    pub fn snapshot(&self) -> Option<CartSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Badge count: total item quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.snapshot
            .borrow()
            .as_ref()
            .map_or(0, CartSnapshot::item_count)
    }

    /// Subscribe to snapshot replacements.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<CartSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Fetch the cart from the server and install the new snapshot,
    /// discarding the old one wholesale.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the fetch fails; the previous snapshot
    /// is left in place.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<CartSnapshot, CartError> {
        let snapshot = self.api.fetch_cart().await?;
        self.snapshot.send_replace(Some(snapshot.clone()));
        Ok(snapshot)
    }

    /// Add a product to the cart, then resynchronize.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the mutation or the resync fetch fails.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        self.api.add_to_cart(product, quantity).await?;
        self.fetch().await
    }

    /// Apply a quantity delta to a line, then resynchronize.
    ///
    /// The server stores absolute quantities, so the target is computed
    /// here from the current snapshot and clamped to a minimum of 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownItem` if the line is not in the current
    /// snapshot, or `CartError::Api` if the mutation or resync fails.
    #[instrument(skip(self))]
    pub async fn change_quantity(
        &self,
        item: CartItemId,
        delta: i32,
    ) -> Result<CartSnapshot, CartError> {
        let current = {
            let snapshot = self.snapshot.borrow();
            snapshot
                .as_ref()
                .and_then(|s| s.line(item))
                .map(|line| line.quantity)
        }
        .ok_or(CartError::UnknownItem(item))?;

        let target = clamped_quantity(current, delta);
        self.api.update_cart_item(item, target).await?;
        self.fetch().await
    }

    /// Remove a line, then resynchronize.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the mutation or the resync fetch fails.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item: CartItemId) -> Result<CartSnapshot, CartError> {
        self.api.remove_cart_item(item).await?;
        self.fetch().await
    }

    /// Move a line to the wishlist: save it locally, then remove it from
    /// the server cart and resynchronize.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownItem` if the line is not in the current
    /// snapshot, `CartError::Store` if the wishlist cannot be written, or
    /// `CartError::Api` if the removal or resync fails.
    #[instrument(skip(self, wishlist))]
    pub async fn save_for_later(
        &self,
        item: CartItemId,
        wishlist: &WishlistCache,
    ) -> Result<CartSnapshot, CartError> {
        let entry = {
            let snapshot = self.snapshot.borrow();
            snapshot
                .as_ref()
                .and_then(|s| s.line(item))
                .map(WishlistEntry::from)
        }
        .ok_or(CartError::UnknownItem(item))?;

        wishlist.save(entry)?;
        self.remove_item(item).await
    }

    /// Move a wishlist entry back into the cart: add it server-side, drop
    /// it from the wishlist, then resynchronize.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Api` if the add or resync fails, or
    /// `CartError::Store` if the wishlist cannot be updated.
    #[instrument(skip(self, wishlist))]
    pub async fn move_to_cart(
        &self,
        wishlist: &WishlistCache,
        product: ProductId,
    ) -> Result<CartSnapshot, CartError> {
        self.api.add_to_cart(product, 1).await?;
        wishlist.remove(product)?;
        self.fetch().await
    }
}
