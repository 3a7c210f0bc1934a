//! Quotation document and its state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_core::{
    CustomerId, DomainError, DomainResult, LineItemId, ProductId, QuotationId, UserId,
};
use billflow_documents::DocumentTotals;

/// Quotation lifecycle status.
///
/// Transitions are one-directional and never skip a state:
/// `draft → pending_approval → approved`. There is no rejection state;
/// the only recovery path is re-requesting from draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    PendingApproval,
    Approved,
}

impl core::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QuotationStatus::Draft => f.write_str("draft"),
            QuotationStatus::PendingApproval => f.write_str("pending_approval"),
            QuotationStatus::Approved => f.write_str("approved"),
        }
    }
}

/// A quotation row. Totals always equal the sums over the current item rows;
/// they are replaced on every item-set change, never adjusted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    /// Unique sequential number, e.g. `Q-0001`.
    pub number: String,
    pub quotation_date: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub customer_id: CustomerId,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: QuotationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub approver_id: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// A quotation line item row, child of exactly one quotation.
///
/// Price and tax rate are snapshots taken from the product when the item set
/// was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    pub id: LineItemId,
    pub quotation_id: QuotationId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied input for one line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationItemDraft {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub description: Option<String>,
    pub sort_order: i32,
}

/// Input for creating a quotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuotation {
    pub quotation_date: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub customer_id: CustomerId,
    pub notes: Option<String>,
    pub items: Vec<QuotationItemDraft>,
}

/// Field-by-field patch: only present fields are applied. A present `items`
/// replaces the whole item set (items are never patched individually).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotationPatch {
    pub quotation_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub customer_id: Option<CustomerId>,
    pub notes: Option<String>,
    pub items: Option<Vec<QuotationItemDraft>>,
}

impl Quotation {
    /// Build a fresh draft quotation with already-computed totals.
    pub fn create(
        id: QuotationId,
        number: String,
        input: &NewQuotation,
        totals: DocumentTotals,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number,
            quotation_date: input.quotation_date,
            expiration_date: input.expiration_date,
            customer_id: input.customer_id,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            status: QuotationStatus::Draft,
            notes: input.notes.clone(),
            created_at,
            created_by,
            approver_id: None,
            approved_at: None,
            updated_at: None,
            updated_by: None,
        }
    }

    /// Guard for operations only permitted while the document is a draft.
    pub fn ensure_draft(&self) -> DomainResult<()> {
        if self.status != QuotationStatus::Draft {
            return Err(DomainError::state_conflict(format!(
                "quotation {} is {}, expected draft",
                self.number, self.status
            )));
        }
        Ok(())
    }

    /// Apply the scalar fields of a patch. Items are the caller's concern;
    /// use `replace_totals` after rewriting the item set.
    pub fn apply_patch(
        &mut self,
        patch: &QuotationPatch,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_draft()?;

        if let Some(quotation_date) = patch.quotation_date {
            self.quotation_date = quotation_date;
        }
        if let Some(expiration_date) = patch.expiration_date {
            self.expiration_date = Some(expiration_date);
        }
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = Some(updated_at);
        self.updated_by = Some(updated_by);
        Ok(())
    }

    /// Overwrite the document totals after the item set was replaced.
    pub fn replace_totals(&mut self, totals: DocumentTotals) {
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total_amount = totals.total_amount;
    }

    /// draft → pending_approval.
    pub fn request_approval(
        &mut self,
        approver_id: UserId,
        notes: Option<String>,
    ) -> DomainResult<()> {
        if self.status != QuotationStatus::Draft {
            return Err(DomainError::state_conflict(format!(
                "cannot request approval for quotation {} in status {}",
                self.number, self.status
            )));
        }
        self.status = QuotationStatus::PendingApproval;
        self.approver_id = Some(approver_id);
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        Ok(())
    }

    /// pending_approval → approved; records the approver and the timestamp.
    pub fn approve(
        &mut self,
        approver_id: UserId,
        approved_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> DomainResult<()> {
        if self.status != QuotationStatus::PendingApproval {
            return Err(DomainError::state_conflict(format!(
                "cannot approve quotation {} in status {}",
                self.number, self.status
            )));
        }
        self.status = QuotationStatus::Approved;
        self.approver_id = Some(approver_id);
        self.approved_at = Some(approved_at);
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals() -> DocumentTotals {
        DocumentTotals {
            subtotal: dec!(100),
            tax_amount: dec!(10),
            total_amount: dec!(110),
        }
    }

    fn draft_quotation() -> Quotation {
        let input = NewQuotation {
            quotation_date: Utc::now(),
            expiration_date: None,
            customer_id: CustomerId::new(),
            notes: None,
            items: vec![],
        };
        Quotation::create(
            QuotationId::new(),
            "Q-0001".to_string(),
            &input,
            totals(),
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn create_starts_in_draft() {
        let q = draft_quotation();
        assert_eq!(q.status, QuotationStatus::Draft);
        assert_eq!(q.total_amount, dec!(110));
        assert!(q.approver_id.is_none());
    }

    #[test]
    fn request_approval_moves_to_pending() {
        let mut q = draft_quotation();
        let approver = UserId::new();
        q.request_approval(approver, Some("please review".to_string()))
            .unwrap();
        assert_eq!(q.status, QuotationStatus::PendingApproval);
        assert_eq!(q.approver_id, Some(approver));
        assert_eq!(q.notes.as_deref(), Some("please review"));
        assert!(q.approved_at.is_none());
    }

    #[test]
    fn approve_requires_pending_approval() {
        let mut q = draft_quotation();
        let err = q.approve(UserId::new(), Utc::now(), None).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn approve_records_approver_and_timestamp() {
        let mut q = draft_quotation();
        q.request_approval(UserId::new(), None).unwrap();

        let approver = UserId::new();
        let at = Utc::now();
        q.approve(approver, at, None).unwrap();

        assert_eq!(q.status, QuotationStatus::Approved);
        assert_eq!(q.approver_id, Some(approver));
        assert_eq!(q.approved_at, Some(at));
    }

    #[test]
    fn no_double_transition() {
        let mut q = draft_quotation();
        q.request_approval(UserId::new(), None).unwrap();
        let err = q.request_approval(UserId::new(), None).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));

        q.approve(UserId::new(), Utc::now(), None).unwrap();
        let err = q.approve(UserId::new(), Utc::now(), None).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn patch_is_rejected_outside_draft() {
        let mut q = draft_quotation();
        q.request_approval(UserId::new(), None).unwrap();

        let err = q
            .apply_patch(&QuotationPatch::default(), UserId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn patch_applies_scalars_and_audit_fields() {
        let mut q = draft_quotation();
        let editor = UserId::new();
        let new_customer = CustomerId::new();

        q.apply_patch(
            &QuotationPatch {
                customer_id: Some(new_customer),
                notes: Some("updated".to_string()),
                ..Default::default()
            },
            editor,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(q.customer_id, new_customer);
        assert_eq!(q.notes.as_deref(), Some("updated"));
        assert_eq!(q.updated_by, Some(editor));
    }

    #[test]
    fn replace_totals_overwrites_all_three_fields() {
        let mut q = draft_quotation();
        q.replace_totals(DocumentTotals {
            subtotal: dec!(200),
            tax_amount: dec!(20),
            total_amount: dec!(220),
        });
        assert_eq!(q.subtotal, dec!(200));
        assert_eq!(q.tax_amount, dec!(20));
        assert_eq!(q.total_amount, dec!(220));
    }
}
