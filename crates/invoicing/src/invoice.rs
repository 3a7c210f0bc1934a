//! Invoice document and its state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_core::{
    CustomerId, DomainError, DomainResult, InvoiceId, LineItemId, ProductId, QuotationId, UserId,
};
use billflow_documents::DocumentTotals;

/// Invoice lifecycle status.
///
/// One extra state compared to quotations: an approved invoice is issued
/// before payments can be registered against it. Transitions are
/// one-directional and never skip a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    PendingApproval,
    Approved,
    Issued,
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvoiceStatus::Draft => f.write_str("draft"),
            InvoiceStatus::PendingApproval => f.write_str("pending_approval"),
            InvoiceStatus::Approved => f.write_str("approved"),
            InvoiceStatus::Issued => f.write_str("issued"),
        }
    }
}

/// How much of the invoice total has been received.
///
/// Always a pure function of payments-received vs. total; see
/// [`PaymentStatus::for_amounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    /// Derive the status from the amount paid so far and the invoice total.
    /// Overpayment still reads `paid`.
    pub fn for_amounts(paid: Decimal, total: Decimal) -> Self {
        if paid <= Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if paid < total {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Paid
        }
    }
}

/// An invoice row. Totals always equal the sums over the current item rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Unique sequential number, e.g. `INV-0001`.
    pub number: String,
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub customer_id: CustomerId,
    /// Set when the invoice originated from a quotation.
    pub quotation_id: Option<QuotationId>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub payment_status: PaymentStatus,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub approver_id: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// An invoice line item row, child of exactly one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: LineItemId,
    pub invoice_id: InvoiceId,
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
pub struct InvoiceItemDraft {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub description: Option<String>,
    pub sort_order: i32,
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub customer_id: CustomerId,
    pub quotation_id: Option<QuotationId>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<InvoiceItemDraft>,
}

/// Field-by-field patch: only present fields are applied. A present `items`
/// replaces the whole item set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub invoice_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub customer_id: Option<CustomerId>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub items: Option<Vec<InvoiceItemDraft>>,
}

impl Invoice {
    /// Build a fresh draft invoice with already-computed totals.
    pub fn create(
        id: InvoiceId,
        number: String,
        input: &NewInvoice,
        totals: DocumentTotals,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number,
            invoice_date: input.invoice_date,
            due_date: input.due_date,
            customer_id: input.customer_id,
            quotation_id: input.quotation_id,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            status: InvoiceStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
            payment_terms: input.payment_terms.clone(),
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
        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::state_conflict(format!(
                "invoice {} is {}, expected draft",
                self.number, self.status
            )));
        }
        Ok(())
    }

    /// Apply the scalar fields of a patch. Items are the caller's concern;
    /// use `replace_totals` after rewriting the item set.
    pub fn apply_patch(
        &mut self,
        patch: &InvoicePatch,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_draft()?;

        if let Some(invoice_date) = patch.invoice_date {
            self.invoice_date = invoice_date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
        }
        if let Some(payment_terms) = &patch.payment_terms {
            self.payment_terms = Some(payment_terms.clone());
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
        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::state_conflict(format!(
                "cannot request approval for invoice {} in status {}",
                self.number, self.status
            )));
        }
        self.status = InvoiceStatus::PendingApproval;
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
        if self.status != InvoiceStatus::PendingApproval {
            return Err(DomainError::state_conflict(format!(
                "cannot approve invoice {} in status {}",
                self.number, self.status
            )));
        }
        self.status = InvoiceStatus::Approved;
        self.approver_id = Some(approver_id);
        self.approved_at = Some(approved_at);
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        Ok(())
    }

    /// approved → issued. Only issued invoices accept payments.
    pub fn issue(&mut self, notes: Option<String>) -> DomainResult<()> {
        if self.status != InvoiceStatus::Approved {
            return Err(DomainError::state_conflict(format!(
                "cannot issue invoice {} in status {}",
                self.number, self.status
            )));
        }
        self.status = InvoiceStatus::Issued;
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        Ok(())
    }

    /// Guard for payment registration.
    pub fn ensure_issued(&self) -> DomainResult<()> {
        if self.status != InvoiceStatus::Issued {
            return Err(DomainError::state_conflict(format!(
                "invoice {} is {}, payments require issued",
                self.number, self.status
            )));
        }
        Ok(())
    }

    /// Recompute `payment_status` from the total received so far.
    pub fn register_paid_amount(&mut self, total_paid: Decimal) {
        self.payment_status = PaymentStatus::for_amounts(total_paid, self.total_amount);
    }
}
