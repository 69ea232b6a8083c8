//! Catalog domain module (products and categories).
//!
//! Marketplace listing rules as plain deterministic types; IO, HTTP, and
//! storage live in the crates around this one.

pub mod category;
pub mod product;
pub mod seller;
pub mod status;

pub use category::{slugify, Category, CategoryDraft, CategoryPatch};
pub use product::{LicensingOption, Product, ProductDraft, ProductPatch, ProductType};
pub use seller::SellerRef;
pub use status::{ProductStatus, TransitionTable};
