//! Line-item total/tax aggregation.
//!
//! Per item: `subtotal = quantity × unit_price`, `tax_amount = subtotal ×
//! tax_rate`, `total_amount = subtotal + tax_amount`. Document totals are the
//! sums over all items. Recomputation is always a total replacement — totals
//! are never incremented in place, so repeated recomputation over an
//! unchanged item set is a fixpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_core::{DomainError, DomainResult};

/// The raw inputs of one line: quantity, snapshotted price and tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineDraft {
    /// Positive integer quantity.
    pub quantity: u32,
    /// Unit price copied from the product at creation/update time.
    pub unit_price: Decimal,
    /// Tax rate fraction (e.g. `0.10`) read from the product at the same
    /// moment.
    pub tax_rate: Decimal,
}

/// Computed money fields of one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Computed money fields of a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Compute one line's money fields, validating the inputs.
pub fn line_totals(draft: &LineDraft) -> DomainResult<LineTotals> {
    if draft.quantity == 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    if draft.unit_price.is_sign_negative() {
        return Err(DomainError::validation(format!(
            "unit price must be non-negative, got {}",
            draft.unit_price
        )));
    }
    if draft.tax_rate.is_sign_negative() {
        return Err(DomainError::validation(format!(
            "tax rate must be non-negative, got {}",
            draft.tax_rate
        )));
    }

    let quantity = Decimal::from(draft.quantity);
    let subtotal = quantity
        .checked_mul(draft.unit_price)
        .ok_or_else(|| DomainError::validation("line subtotal overflow"))?;
    let tax_amount = subtotal
        .checked_mul(draft.tax_rate)
        .ok_or_else(|| DomainError::validation("line tax amount overflow"))?;
    let total_amount = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| DomainError::validation("line total overflow"))?;

    Ok(LineTotals {
        subtotal,
        tax_amount,
        total_amount,
    })
}

/// Sum per-line totals into document totals.
pub fn aggregate<'a, I>(lines: I) -> DomainResult<DocumentTotals>
where
    I: IntoIterator<Item = &'a LineTotals>,
{
    let mut doc = DocumentTotals::default();
    for line in lines {
        doc.subtotal = doc
            .subtotal
            .checked_add(line.subtotal)
            .ok_or_else(|| DomainError::validation("document subtotal overflow"))?;
        doc.tax_amount = doc
            .tax_amount
            .checked_add(line.tax_amount)
            .ok_or_else(|| DomainError::validation("document tax amount overflow"))?;
        doc.total_amount = doc
            .total_amount
            .checked_add(line.total_amount)
            .ok_or_else(|| DomainError::validation("document total overflow"))?;
    }
    Ok(doc)
}
