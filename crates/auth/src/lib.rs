//! `bazaar-auth` — identity, sessions, and mutation authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage engines.

pub mod accounts;
pub mod guard;
pub mod identity;
pub mod role;
pub mod service;
pub mod session;
pub mod user;

pub use accounts::{AccountDirectory, InMemoryAccountDirectory, UserAccount};
pub use guard::{authorize_admin, authorize_mutation, AuthzError, OwnedResource};
pub use identity::resolve_identity;
pub use role::Role;
pub use service::{AuthService, SignupFields};
pub use session::{InMemorySessionStore, SessionStore, SessionToken};
pub use user::User;
