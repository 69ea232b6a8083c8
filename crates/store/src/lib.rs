//! Storage layer: generic document repository and revalidation fan-out.

pub mod repository;
pub mod revalidation;

pub use repository::{
    collections, Filter, InMemoryRepository, PostgresRepository, Repository, RepositoryError,
};
pub use revalidation::{Revalidation, RevalidationChannel};
