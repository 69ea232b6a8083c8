//! Generic document persistence boundary.
//!
//! This module defines the repository abstraction the action layer depends
//! on, without making storage assumptions: named collections of JSON
//! documents with filtered reads and shallow-merge updates.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use r#trait::{Filter, Repository, RepositoryError};

/// Collection names used by the marketplace.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
}
