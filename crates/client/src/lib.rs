//! Client-side session lifecycle.
//!
//! A storefront process holds one [`SessionController`]: an explicit context
//! object owning the single-slot identity cache ([`AuthPhase`]) and the auth
//! calls that move it. Collaborators are traits so UI shells and tests plug
//! in their own transport, cart, and navigation:
//!
//! - [`AuthGateway`]: login/signup/logout/check against the HTTP API
//!   ([`HttpAuthGateway`] is the production implementation)
//! - [`CartSync`]: best-effort cart reconciliation after sign-in
//! - [`Navigator`]: route changes driven by the controller (logout lands on
//!   `/`)

pub mod cart;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod navigator;
pub mod state;

pub use cart::{CartSync, NoopCartSync};
pub use controller::SessionController;
pub use error::ClientError;
pub use gateway::{AuthGateway, HttpAuthGateway};
pub use navigator::{Navigator, NoopNavigator};
pub use state::AuthPhase;
