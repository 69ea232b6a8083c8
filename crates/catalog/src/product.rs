//! Product listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_auth::{OwnedResource, Role};
use bazaar_core::{CategoryId, DomainError, DomainResult, ProductId, UserId};

use crate::{ProductStatus, SellerRef, TransitionTable};

/// Kind of digital good being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    WebsiteTemplate,
    DesignAsset,
    #[serde(rename = "3d-model")]
    ThreeDModel,
    Font,
    CadFile,
    UiKit,
    Other,
}

/// Usage license attached to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicensingOption {
    SingleUse,
    MultipleUse,
    Commercial,
    Personal,
}

/// A marketplace listing.
///
/// The owning seller is set at creation and immutable afterwards: no patch
/// path reaches it. `status` moves only through `change_status`, which
/// consults the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub product_type: ProductType,
    pub category: CategoryId,
    /// Technology tags; deduplicated, first-seen order preserved.
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Price in minor currency units.
    pub price: u64,
    #[serde(default)]
    pub licensing_option: Option<LicensingOption>,
    pub status: ProductStatus,
    pub seller: SellerRef,
    /// Ordered preview image references.
    #[serde(default)]
    pub preview_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a listing.
///
/// No `seller` or `status` here: the seller is always the caller's resolved
/// identity, and new listings start as drafts.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub product_type: ProductType,
    pub category: CategoryId,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub price: u64,
    #[serde(default)]
    pub licensing_option: Option<LicensingOption>,
    #[serde(default)]
    pub preview_images: Vec<String>,
}

/// Partial listing update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub licensing_option: Option<LicensingOption>,
    #[serde(default)]
    pub preview_images: Option<Vec<String>>,
}

impl Product {
    /// Create a draft listing owned by `seller`.
    pub fn create(draft: ProductDraft, seller: UserId) -> DomainResult<Self> {
        let name = non_empty("product name", draft.name)?;
        let description = non_empty("product description", draft.description)?;
        let now = Utc::now();

        Ok(Self {
            id: ProductId::new(),
            name,
            description,
            product_type: draft.product_type,
            category: draft.category,
            technologies: dedupe_tags(draft.technologies),
            price: draft.price,
            licensing_option: draft.licensing_option,
            status: ProductStatus::Draft,
            seller: SellerRef::from(seller),
            preview_images: draft.preview_images,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. Seller and status are not reachable from here.
    pub fn apply_patch(&mut self, patch: ProductPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = non_empty("product name", name)?;
        }
        if let Some(description) = patch.description {
            self.description = non_empty("product description", description)?;
        }
        if let Some(product_type) = patch.product_type {
            self.product_type = product_type;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = dedupe_tags(technologies);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(licensing_option) = patch.licensing_option {
            self.licensing_option = Some(licensing_option);
        }
        if let Some(preview_images) = patch.preview_images {
            self.preview_images = preview_images;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move the listing to `to` on behalf of a user acting in `role`.
    pub fn change_status(
        &mut self,
        to: ProductStatus,
        role: Role,
        table: &TransitionTable,
    ) -> DomainResult<()> {
        table.check(role, self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl OwnedResource for Product {
    fn owner_id(&self) -> UserId {
        self.seller.owner_id()
    }
}

fn non_empty(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Deduplicate tags case-insensitively, keeping first-seen order.
fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim().to_string();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            out.push(tag);
        }
    }

    out
}
