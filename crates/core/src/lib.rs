//! `bazaar-core` — domain foundation building blocks.
//!
//! Identifier newtypes and the shared error model; everything here is plain
//! data with no infrastructure attached.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, UserId};
