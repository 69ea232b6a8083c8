//! Newtype identifiers for the marketplace entities.
//!
//! Wrapping `Uuid` once per entity keeps a listing id from ever standing in
//! for a user id in a signature. On the wire and in stored documents they are
//! plain UUID strings.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh, time-ordered (UUIDv7) identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self).map_err(|e| {
                    DomainError::invalid_id(format!(
                        concat!(stringify!($name), ": {}"),
                        e
                    ))
                })
            }
        }
    };
}

entity_id! {
    /// Identity of an account holder.
    UserId
}

entity_id! {
    /// Identity of a listing.
    ProductId
}

entity_id! {
    /// Identity of a catalog category.
    CategoryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_display_and_parse() {
        let id = ProductId::new();
        let Ok(back) = id.to_string().parse::<ProductId>() else {
            panic!("displayed id failed to parse");
        };
        assert_eq!(back, id);
    }

    #[test]
    fn garbage_is_an_invalid_id() {
        assert!(matches!(
            "not-a-uuid".parse::<UserId>(),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn serde_form_is_the_plain_uuid_string() {
        let id = CategoryId::new();
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("id failed to serialize");
        };
        assert_eq!(json, format!("\"{id}\""));
    }
}
