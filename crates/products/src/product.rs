//! Product entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_core::{DomainError, DomainResult, ProductId, UserId};

/// Product catalog status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Discontinued,
}

/// A catalog product.
///
/// `tax_rate` is a fraction (e.g. `0.10` for 10%). Documents copy
/// `unit_price` and `tax_rate` onto their line items when the item set is
/// written; later product edits do not touch existing items until a full
/// item replacement re-reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unique across the catalog (enforced by the storage layer).
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub unit: Option<String>,
    pub minimum_quantity: Option<u32>,
    pub status: ProductStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
    pub unit: Option<String>,
    pub minimum_quantity: Option<u32>,
    pub status: ProductStatus,
    pub notes: Option<String>,
}

/// Field-by-field patch: only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub unit: Option<String>,
    pub minimum_quantity: Option<u32>,
    pub status: Option<ProductStatus>,
    pub notes: Option<String>,
}

impl Product {
    pub fn create(
        id: ProductId,
        input: NewProduct,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = input.code.trim().to_string();
        if code.is_empty() {
            return Err(DomainError::validation("product code cannot be empty"));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        ensure_non_negative("unit price", input.unit_price)?;
        ensure_non_negative("tax rate", input.tax_rate)?;

        Ok(Self {
            id,
            code,
            name: input.name.trim().to_string(),
            description: input.description,
            category: input.category,
            unit_price: input.unit_price,
            tax_rate: input.tax_rate,
            unit: input.unit,
            minimum_quantity: input.minimum_quantity,
            status: input.status,
            notes: input.notes,
            created_at,
            created_by,
            updated_at: None,
            updated_by: None,
        })
    }

    /// Apply the provided fields, leaving absent ones untouched.
    ///
    /// The code is deliberately not patchable: issued documents reference
    /// products by id, and the code is the stable human-facing key.
    pub fn apply_patch(
        &mut self,
        patch: ProductPatch,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty"));
            }
            self.name = name.trim().to_string();
        }
        if let Some(unit_price) = patch.unit_price {
            ensure_non_negative("unit price", unit_price)?;
            self.unit_price = unit_price;
        }
        if let Some(tax_rate) = patch.tax_rate {
            ensure_non_negative("tax rate", tax_rate)?;
            self.tax_rate = tax_rate;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(unit) = patch.unit {
            self.unit = Some(unit);
        }
        if let Some(minimum_quantity) = patch.minimum_quantity {
            self.minimum_quantity = Some(minimum_quantity);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Some(updated_at);
        self.updated_by = Some(updated_by);
        Ok(())
    }
}

fn ensure_non_negative(what: &str, value: Decimal) -> DomainResult<()> {
    if value.is_sign_negative() {
        return Err(DomainError::validation(format!(
            "{what} must be non-negative, got {value}"
        )));
    }
    Ok(())
}
