//! Product status lifecycle and the owner transition policy.

use core::str::FromStr;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use bazaar_auth::Role;
use bazaar_core::{DomainError, DomainResult};

/// Listing status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Active,
    Inactive,
    Rejected,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 4] = [
        ProductStatus::Draft,
        ProductStatus::Active,
        ProductStatus::Inactive,
        ProductStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "rejected" => Ok(ProductStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown status: {other}"))),
        }
    }
}

/// Status moves a product owner may make.
///
/// Admins are never checked against the table: moderation must be able to
/// reach any status from any status. Owners are confined to the configured
/// pairs, so the policy is a deployment choice rather than hard-coded logic.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    owner_moves: HashSet<(ProductStatus, ProductStatus)>,
}

impl TransitionTable {
    /// Empty table: owners may not change status at all.
    pub fn new() -> Self {
        Self {
            owner_moves: HashSet::new(),
        }
    }

    /// Allow owners to move `from` → `to`.
    pub fn allow(mut self, from: ProductStatus, to: ProductStatus) -> Self {
        self.owner_moves.insert((from, to));
        self
    }

    /// Default marketplace policy: owners move freely between `draft`,
    /// `active` and `inactive` (self-moves included, so re-submitting the
    /// current status is not an error); `rejected` is reserved to moderation.
    pub fn marketplace() -> Self {
        let open = [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Inactive,
        ];
        let mut table = Self::new();
        for from in open {
            for to in open {
                table = table.allow(from, to);
            }
        }
        table
    }

    pub fn permits(&self, role: Role, from: ProductStatus, to: ProductStatus) -> bool {
        role == Role::Admin || self.owner_moves.contains(&(from, to))
    }

    /// `permits`, reported as the standard validation failure.
    pub fn check(&self, role: Role, from: ProductStatus, to: ProductStatus) -> DomainResult<()> {
        if self.permits(role, from, to) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "status transition not permitted: {from} -> {to}"
            )))
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::marketplace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_move_freely_outside_rejected() {
        let table = TransitionTable::marketplace();
        let open = [
            ProductStatus::Draft,
            ProductStatus::Active,
            ProductStatus::Inactive,
        ];

        for from in open {
            for to in open {
                assert!(table.permits(Role::Seller, from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn resubmitting_the_current_status_is_permitted() {
        let table = TransitionTable::marketplace();
        assert!(table.permits(Role::Seller, ProductStatus::Active, ProductStatus::Active));
    }

    #[test]
    fn owners_may_not_touch_rejected() {
        let table = TransitionTable::marketplace();

        for other in ProductStatus::ALL {
            assert!(
                !table.permits(Role::Seller, other, ProductStatus::Rejected),
                "{other} -> rejected"
            );
            assert!(
                !table.permits(Role::Seller, ProductStatus::Rejected, other),
                "rejected -> {other}"
            );
        }
    }

    #[test]
    fn admins_bypass_the_table_entirely() {
        let table = TransitionTable::new();

        for from in ProductStatus::ALL {
            for to in ProductStatus::ALL {
                assert!(table.permits(Role::Admin, from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn custom_tables_are_respected() {
        let table = TransitionTable::new().allow(ProductStatus::Draft, ProductStatus::Active);

        assert!(table.permits(Role::Seller, ProductStatus::Draft, ProductStatus::Active));
        assert!(!table.permits(Role::Seller, ProductStatus::Active, ProductStatus::Draft));

        let denied = table.check(
            Role::Seller,
            ProductStatus::Active,
            ProductStatus::Draft,
        );
        assert!(matches!(denied, Err(DomainError::Validation(_))));
    }

    #[test]
    fn status_parses_its_wire_names() {
        for status in ProductStatus::ALL {
            assert_eq!(ProductStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(ProductStatus::from_str("archived").is_err());
    }
}
