//! Subcommand implementations.
//!
//! Each module wires the client SDK together from configuration and renders
//! results; no business logic lives here.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use freshbasket_client::api::ApiClient;
use freshbasket_client::config::StoreConfig;
use freshbasket_client::session::SessionStore;
use freshbasket_client::store::LocalStore;
use freshbasket_client::wishlist::WishlistCache;

/// Everything a subcommand needs: local state and the API client sharing it.
pub struct Context {
    pub store: LocalStore,
    pub api: ApiClient,
    pub wishlist: WishlistCache,
}

impl Context {
    /// Build the shared context from environment configuration.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = StoreConfig::from_env()?;
        let store = LocalStore::open(config.state_path())?;
        let session = SessionStore::new(store.clone());
        let api = ApiClient::new(&config, session)?;
        let wishlist = WishlistCache::new(store.clone());

        Ok(Self {
            store,
            api,
            wishlist,
        })
    }
}
