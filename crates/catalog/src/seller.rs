//! Owning-seller reference.

use serde::{Deserialize, Serialize};

use bazaar_auth::User;
use bazaar_core::UserId;

/// Seller relation as stored on a product.
///
/// Repository documents carry either a bare user id or, when the relation was
/// populated at read time, the embedded user object. Both shapes resolve here
/// once, at the document boundary; downstream code asks for `owner_id` and
/// never probes the shape again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SellerRef {
    Reference(UserId),
    Populated(User),
}

impl SellerRef {
    pub fn owner_id(&self) -> UserId {
        match self {
            SellerRef::Reference(id) => *id,
            SellerRef::Populated(user) => user.id,
        }
    }

    /// The embedded user, when the relation was populated.
    pub fn populated(&self) -> Option<&User> {
        match self {
            SellerRef::Populated(user) => Some(user),
            SellerRef::Reference(_) => None,
        }
    }
}

impl From<UserId> for SellerRef {
    fn from(id: UserId) -> Self {
        SellerRef::Reference(id)
    }
}

impl From<User> for SellerRef {
    fn from(user: User) -> Self {
        SellerRef::Populated(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_auth::Role;

    #[test]
    fn bare_id_serializes_as_a_plain_string() {
        let id = UserId::new();
        let seller = SellerRef::from(id);

        let Ok(json) = serde_json::to_value(&seller) else {
            panic!("expected serialization to succeed");
        };
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn both_wire_shapes_deserialize_to_the_right_variant() {
        let Ok(user) = User::new("ada@example.com", "Ada", Role::Seller) else {
            panic!("expected user creation to succeed");
        };

        let Ok(from_string) =
            serde_json::from_value::<SellerRef>(serde_json::json!(user.id.to_string()))
        else {
            panic!("expected string shape to deserialize");
        };
        assert_eq!(from_string, SellerRef::Reference(user.id));

        let Ok(embedded) = serde_json::to_value(&user) else {
            panic!("expected user serialization to succeed");
        };
        let Ok(from_object) = serde_json::from_value::<SellerRef>(embedded) else {
            panic!("expected object shape to deserialize");
        };
        assert_eq!(from_object.owner_id(), user.id);
        assert_eq!(from_object.populated(), Some(&user));
    }

    #[test]
    fn owner_id_is_total_over_both_variants() {
        let Ok(user) = User::new("ada@example.com", "Ada", Role::Seller) else {
            panic!("expected user creation to succeed");
        };
        let id = user.id;

        assert_eq!(SellerRef::from(id).owner_id(), id);
        assert_eq!(SellerRef::from(user).owner_id(), id);
    }
}
