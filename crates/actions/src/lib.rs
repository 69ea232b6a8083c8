//! Action layer: authorization-scoped CRUD wrapped in a uniform outcome
//! envelope.
//!
//! The action layer sits between the transport (HTTP, tests) and the domain:
//! it resolves identity from the request token, runs the ownership guard for
//! mutations, calls the repository, and reports every result as
//! `Result<T, ActionError>` (serialized at the boundary as [`Outcome`]).

pub mod categories;
pub mod error;
pub mod outcome;
pub mod products;

pub use categories::CategoryActions;
pub use error::{ActionError, ErrorKind};
pub use outcome::Outcome;
pub use products::ProductActions;
