//! Categories and slug derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, DomainError, DomainResult};

/// A browsing category. Managed by admins, read by anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Image reference for the category tile.
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Partial category update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Category {
    /// Build a category from a draft, deriving the slug from the name when
    /// none is supplied. Explicit slugs are normalized through the same
    /// derivation, so stored slugs are always in canonical form.
    pub fn from_draft(draft: CategoryDraft) -> DomainResult<Self> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("category name must not be empty"));
        }

        let slug = match draft.slug {
            Some(explicit) if !explicit.trim().is_empty() => slugify(&explicit),
            _ => slugify(&name),
        };
        if slug.is_empty() {
            return Err(DomainError::validation(format!(
                "name does not yield a usable slug: {name}"
            )));
        }

        Ok(Self {
            id: CategoryId::new(),
            name,
            slug,
            description: draft.description,
            icon: draft.icon,
            created_at: Utc::now(),
        })
    }

    /// Apply a partial update. A new name re-derives the slug unless the
    /// patch also sets one explicitly.
    pub fn apply_patch(&mut self, patch: CategoryPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("category name must not be empty"));
            }
            if patch.slug.is_none() {
                let slug = slugify(&name);
                if slug.is_empty() {
                    return Err(DomainError::validation(format!(
                        "name does not yield a usable slug: {name}"
                    )));
                }
                self.slug = slug;
            }
            self.name = name;
        }

        if let Some(explicit) = patch.slug {
            let slug = slugify(&explicit);
            if slug.is_empty() {
                return Err(DomainError::validation(format!(
                    "unusable slug: {explicit}"
                )));
            }
            self.slug = slug;
        }

        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(icon) = patch.icon {
            self.icon = Some(icon);
        }

        Ok(())
    }
}

/// Derive a URL slug from a display name.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-`, and drops leading/trailing `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> CategoryDraft {
        CategoryDraft {
            name: name.to_string(),
            slug: None,
            description: None,
            icon: None,
        }
    }

    #[test]
    fn slug_is_derived_from_the_name() {
        let cases = [
            ("3D Models & CAD", "3d-models-cad"),
            ("Fonts", "fonts"),
            ("  UI Kits  ", "ui-kits"),
            ("Website templates!!", "website-templates"),
            ("déjà vu", "d-j-vu"),
        ];

        for (name, expected) in cases {
            assert_eq!(slugify(name), expected, "name: {name}");
        }
    }

    #[test]
    fn explicit_slug_wins_over_derivation_but_is_normalized() {
        let mut d = draft("Design Assets");
        d.slug = Some("Design--ASSETS ".to_string());

        let Ok(category) = Category::from_draft(d) else {
            panic!("expected draft to be accepted");
        };
        assert_eq!(category.slug, "design-assets");
        assert_eq!(category.name, "Design Assets");
    }

    #[test]
    fn unusable_names_are_rejected() {
        assert!(matches!(
            Category::from_draft(draft("   ")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Category::from_draft(draft("!!!")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn renaming_rederives_the_slug() {
        let Ok(mut category) = Category::from_draft(draft("Fonts")) else {
            panic!("expected draft to be accepted");
        };

        let result = category.apply_patch(CategoryPatch {
            name: Some("Icon Packs".to_string()),
            ..CategoryPatch::default()
        });
        assert_eq!(result, Ok(()));
        assert_eq!(category.name, "Icon Packs");
        assert_eq!(category.slug, "icon-packs");
    }

    #[test]
    fn explicit_slug_in_patch_suppresses_rederivation() {
        let Ok(mut category) = Category::from_draft(draft("Fonts")) else {
            panic!("expected draft to be accepted");
        };

        let result = category.apply_patch(CategoryPatch {
            name: Some("Icon Packs".to_string()),
            slug: Some("icons".to_string()),
            ..CategoryPatch::default()
        });
        assert_eq!(result, Ok(()));
        assert_eq!(category.slug, "icons");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: derivation is a fixpoint (a slug slugifies to itself).
            #[test]
            fn slugify_is_idempotent(name in ".{0,64}") {
                let once = slugify(&name);
                prop_assert_eq!(slugify(&once), once);
            }

            /// Property: output is canonical (lowercase alphanumerics and
            /// single dashes, never at the edges).
            #[test]
            fn slugs_are_canonical(name in ".{0,64}") {
                let slug = slugify(&name);

                prop_assert!(slug.chars().all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit()));
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            /// Property: alphanumeric names survive with their characters intact.
            #[test]
            fn alphanumeric_names_keep_their_characters(name in "[a-z0-9]{1,32}") {
                prop_assert_eq!(slugify(&name), name);
            }
        }
    }
}
