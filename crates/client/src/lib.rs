//! Freshbasket client - headless storefront SDK.
//!
//! This crate is the client side of a storefront whose durable state
//! (catalog, cart, orders, payments) lives behind an external REST API. It
//! owns nothing but a local snapshot of that state and the orchestration
//! needed to mutate it safely:
//!
//! - [`session`] - Persisted token pair (access/refresh) in a local store
//! - [`api`] - Typed wrapper over the REST surface with silent token refresh
//! - [`cart`] - Server-authoritative cart snapshot with mutate-then-refetch
//! - [`checkout`] - The order → gateway order → widget → verify state machine
//! - [`wishlist`] - Local-only "saved for later" mirror
//! - [`auth`] - Signup / OTP / login flows and the post-login landing route
//!
//! # Architecture
//!
//! The server is the sole source of truth: the cart snapshot is replaced
//! wholesale after every mutation and totals are never recomputed locally.
//! Checkout state is held per attempt and additionally persisted until a
//! terminal state is reached, so an interrupted payment can be reconciled
//! against the order history on the next start.
//!
//! # Example
//!
//! ```rust,ignore
//! use freshbasket_client::api::ApiClient;
//! use freshbasket_client::cart::CartViewModel;
//! use freshbasket_client::config::StoreConfig;
//! use freshbasket_client::session::SessionStore;
//! use freshbasket_client::store::LocalStore;
//!
//! let config = StoreConfig::from_env()?;
//! let store = LocalStore::open(config.data_dir.join("state.json"))?;
//! let session = SessionStore::new(store.clone());
//! let api = ApiClient::new(&config, session.clone())?;
//!
//! let cart = CartViewModel::new(api.clone());
//! cart.fetch().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod store;
pub mod wishlist;
