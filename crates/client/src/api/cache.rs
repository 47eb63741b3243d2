//! Cache types for catalog API responses.
//!
//! Only catalog reads are cached. The cart is a snapshot replaced wholesale
//! on every fetch and must never be served from a TTL cache.

use super::types::{Category, Product};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
}
