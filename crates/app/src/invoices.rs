//! Invoice lifecycle service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_auth::{authorize, may, Action};
use billflow_core::{
    DomainError, InvoiceId, LineItemId, Pagination, PaymentId, QuotationId, SortOrder, UserId,
};
use billflow_documents::{
    aggregate, line_totals, next_number, DocumentKind, DocumentTotals, LineDraft,
};
use billflow_invoicing::{
    Invoice, InvoiceItem, InvoiceItemDraft, InvoicePatch, NewInvoice, NewPayment, Payment,
};
use billflow_quotations::QuotationStatus;
use billflow_store::{Gateway, InvoiceFilter, Transaction};

use crate::error::AppResult;
use crate::support::load_actor;

/// An invoice together with its item rows and payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
}

/// Invoice-side half of the document lifecycle. Creation, editing and issuing
/// are gated by `create_invoice`, approval by `approve_invoice`, payment
/// registration by `manage_revenue`.
pub struct InvoiceService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> InvoiceService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn create(
        &self,
        actor_id: UserId,
        input: NewInvoice,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<InvoiceDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateInvoice)?;

        if tx.customer(input.customer_id)?.is_none() {
            return Err(
                DomainError::validation(format!("unknown customer {}", input.customer_id)).into(),
            );
        }
        if let Some(quotation_id) = input.quotation_id {
            if tx.quotation(quotation_id)?.is_none() {
                return Err(
                    DomainError::validation(format!("unknown quotation {quotation_id}")).into(),
                );
            }
        }

        let id = InvoiceId::new();
        let (items, totals) = build_items(&tx, id, &input.items, occurred_at)?;
        let number = next_number(
            DocumentKind::Invoice,
            tx.latest_invoice_number()?.as_deref(),
        );
        let invoice = Invoice::create(id, number, &input, totals, actor_id, occurred_at);

        tx.insert_invoice(invoice.clone(), items.clone())?;
        tx.commit()?;

        tracing::info!(invoice = %invoice.number, items = items.len(), "invoice created");
        Ok(InvoiceDetail {
            invoice,
            items,
            payments: vec![],
        })
    }

    /// Build a draft invoice from an approved quotation, carrying over the
    /// customer, item snapshots and totals.
    pub fn create_from_quotation(
        &self,
        actor_id: UserId,
        quotation_id: QuotationId,
        due_date: Option<DateTime<Utc>>,
        payment_terms: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<InvoiceDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateInvoice)?;

        let quotation = tx.quotation(quotation_id)?.ok_or(DomainError::NotFound)?;
        if quotation.status != QuotationStatus::Approved {
            return Err(DomainError::state_conflict(format!(
                "quotation {} is {}, only approved quotations convert to invoices",
                quotation.number, quotation.status
            ))
            .into());
        }

        let id = InvoiceId::new();
        let items: Vec<InvoiceItem> = tx
            .quotation_items(quotation_id)?
            .into_iter()
            .map(|item| InvoiceItem {
                id: LineItemId::new(),
                invoice_id: id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
                tax_rate: item.tax_rate,
                tax_amount: item.tax_amount,
                total_amount: item.total_amount,
                description: item.description,
                sort_order: item.sort_order,
                created_at: occurred_at,
            })
            .collect();

        let input = NewInvoice {
            invoice_date: occurred_at,
            due_date,
            customer_id: quotation.customer_id,
            quotation_id: Some(quotation_id),
            payment_terms,
            notes: quotation.notes.clone(),
            items: vec![],
        };
        let totals = DocumentTotals {
            subtotal: quotation.subtotal,
            tax_amount: quotation.tax_amount,
            total_amount: quotation.total_amount,
        };
        let number = next_number(
            DocumentKind::Invoice,
            tx.latest_invoice_number()?.as_deref(),
        );
        let invoice = Invoice::create(id, number, &input, totals, actor_id, occurred_at);

        tx.insert_invoice(invoice.clone(), items.clone())?;
        tx.commit()?;

        tracing::info!(
            invoice = %invoice.number,
            quotation = %quotation.number,
            "invoice created from quotation"
        );
        Ok(InvoiceDetail {
            invoice,
            items,
            payments: vec![],
        })
    }

    /// Patch a draft. A present `items` replaces the whole item set and
    /// recomputes the totals.
    pub fn update(
        &self,
        actor_id: UserId,
        id: InvoiceId,
        patch: InvoicePatch,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<InvoiceDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateInvoice)?;

        let mut invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        if let Some(customer_id) = patch.customer_id {
            if tx.customer(customer_id)?.is_none() {
                return Err(
                    DomainError::validation(format!("unknown customer {customer_id}")).into(),
                );
            }
        }
        invoice.apply_patch(&patch, actor_id, occurred_at)?;

        let items = match &patch.items {
            Some(drafts) => {
                let (items, totals) = build_items(&tx, id, drafts, occurred_at)?;
                tx.replace_invoice_items(id, items.clone())?;
                invoice.replace_totals(totals);
                items
            }
            None => tx.invoice_items(id)?,
        };

        let payments = tx.payments(id)?;
        tx.update_invoice(invoice.clone())?;
        tx.commit()?;

        tracing::info!(invoice = %invoice.number, "invoice updated");
        Ok(InvoiceDetail {
            invoice,
            items,
            payments,
        })
    }

    pub fn get(&self, actor_id: UserId, id: InvoiceId) -> AppResult<InvoiceDetail> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        let items = tx.invoice_items(id)?;
        let payments = tx.payments(id)?;
        Ok(InvoiceDetail {
            invoice,
            items,
            payments,
        })
    }

    pub fn list(
        &self,
        actor_id: UserId,
        filter: InvoiceFilter,
        page: Pagination,
        order: SortOrder,
    ) -> AppResult<Vec<Invoice>> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.list_invoices(&filter, page, order)?)
    }

    /// draft → pending_approval, addressed to a specific approver.
    pub fn request_approval(
        &self,
        actor_id: UserId,
        id: InvoiceId,
        approver_id: UserId,
        notes: Option<String>,
    ) -> AppResult<Invoice> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateInvoice)?;

        let approver = tx
            .user(approver_id)?
            .ok_or_else(|| DomainError::validation(format!("unknown approver {approver_id}")))?;
        if !may(&approver, Action::ApproveInvoice) {
            return Err(DomainError::validation(format!(
                "user {approver_id} cannot approve invoices"
            ))
            .into());
        }

        let mut invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        invoice.request_approval(approver_id, notes)?;
        tx.update_invoice(invoice.clone())?;
        tx.commit()?;

        tracing::info!(invoice = %invoice.number, approver = %approver_id, "approval requested");
        Ok(invoice)
    }

    /// pending_approval → approved; the actor becomes the approver of record.
    pub fn approve(
        &self,
        actor_id: UserId,
        id: InvoiceId,
        notes: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Invoice> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::ApproveInvoice)?;

        let mut invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        invoice.approve(actor_id, occurred_at, notes)?;
        tx.update_invoice(invoice.clone())?;
        tx.commit()?;

        tracing::info!(invoice = %invoice.number, "invoice approved");
        Ok(invoice)
    }

    /// approved → issued. Only issued invoices accept payments.
    pub fn issue(
        &self,
        actor_id: UserId,
        id: InvoiceId,
        notes: Option<String>,
    ) -> AppResult<Invoice> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateInvoice)?;

        let mut invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        invoice.issue(notes)?;
        tx.update_invoice(invoice.clone())?;
        tx.commit()?;

        tracing::info!(invoice = %invoice.number, "invoice issued");
        Ok(invoice)
    }

    /// Record a payment against an issued invoice and recompute its payment
    /// status from the full payment history.
    pub fn register_payment(
        &self,
        actor_id: UserId,
        id: InvoiceId,
        input: NewPayment,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<InvoiceDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::ManageRevenue)?;

        let mut invoice = tx.invoice(id)?.ok_or(DomainError::NotFound)?;
        invoice.ensure_issued()?;

        let payment = Payment::create(PaymentId::new(), id, input, actor_id, occurred_at)?;
        tx.insert_payment(payment)?;

        let payments = tx.payments(id)?;
        let total_paid = payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.amount))
            .ok_or_else(|| DomainError::validation("payment total overflow"))?;
        invoice.register_paid_amount(total_paid);
        let items = tx.invoice_items(id)?;
        tx.update_invoice(invoice.clone())?;
        tx.commit()?;

        tracing::info!(
            invoice = %invoice.number,
            total_paid = %total_paid,
            payment_status = ?invoice.payment_status,
            "payment registered"
        );
        Ok(InvoiceDetail {
            invoice,
            items,
            payments,
        })
    }
}

/// Resolve item drafts into rows; tax rates are read from the products now.
fn build_items<T: Transaction>(
    tx: &T,
    invoice_id: InvoiceId,
    drafts: &[InvoiceItemDraft],
    occurred_at: DateTime<Utc>,
) -> AppResult<(Vec<InvoiceItem>, DocumentTotals)> {
    let mut items = Vec::with_capacity(drafts.len());
    let mut lines = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let product = tx.product(draft.product_id)?.ok_or_else(|| {
            DomainError::validation(format!("unknown product {}", draft.product_id))
        })?;
        let totals = line_totals(&LineDraft {
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            tax_rate: product.tax_rate,
        })?;
        items.push(InvoiceItem {
            id: LineItemId::new(),
            invoice_id,
            product_id: draft.product_id,
            quantity: draft.quantity,
            unit_price: draft.unit_price,
            subtotal: totals.subtotal,
            tax_rate: product.tax_rate,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            description: draft.description.clone(),
            sort_order: draft.sort_order,
            created_at: occurred_at,
        });
        lines.push(totals);
    }

    let document = aggregate(lines.iter())?;
    Ok((items, document))
}
