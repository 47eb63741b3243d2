//! Freshbasket Core - Shared types library.
//!
//! This crate provides common types used across all Freshbasket components:
//! - `client` - Headless storefront client SDK
//! - `cli` - Command-line driver for the client SDK
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money amounts, roles,
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
