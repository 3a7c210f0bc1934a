//! Quotation lifecycle service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billflow_auth::{authorize, may, Action};
use billflow_core::{DomainError, LineItemId, Pagination, QuotationId, SortOrder, UserId};
use billflow_documents::{
    aggregate, line_totals, next_number, DocumentKind, DocumentTotals, LineDraft,
};
use billflow_quotations::{
    NewQuotation, Quotation, QuotationItem, QuotationItemDraft, QuotationPatch,
};
use billflow_store::{Gateway, QuotationFilter, Transaction};

use crate::error::AppResult;
use crate::support::load_actor;

/// A quotation together with its item rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationDetail {
    pub quotation: Quotation,
    pub items: Vec<QuotationItem>,
}

/// Quote-side half of the document lifecycle. Creation and editing are gated
/// by `create_quote`, approval by `approve_quote`.
pub struct QuotationService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> QuotationService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn create(
        &self,
        actor_id: UserId,
        input: NewQuotation,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<QuotationDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateQuotation)?;

        if tx.customer(input.customer_id)?.is_none() {
            return Err(
                DomainError::validation(format!("unknown customer {}", input.customer_id)).into(),
            );
        }

        let id = QuotationId::new();
        let (items, totals) = build_items(&tx, id, &input.items, occurred_at)?;
        let number = next_number(
            DocumentKind::Quotation,
            tx.latest_quotation_number()?.as_deref(),
        );
        let quotation = Quotation::create(id, number, &input, totals, actor_id, occurred_at);

        tx.insert_quotation(quotation.clone(), items.clone())?;
        tx.commit()?;

        tracing::info!(quotation = %quotation.number, items = items.len(), "quotation created");
        Ok(QuotationDetail { quotation, items })
    }

    /// Patch a draft. A present `items` replaces the whole item set and
    /// recomputes the totals; tax rates are re-read from the referenced
    /// products.
    pub fn update(
        &self,
        actor_id: UserId,
        id: QuotationId,
        patch: QuotationPatch,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<QuotationDetail> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateQuotation)?;

        let mut quotation = tx.quotation(id)?.ok_or(DomainError::NotFound)?;
        if let Some(customer_id) = patch.customer_id {
            if tx.customer(customer_id)?.is_none() {
                return Err(
                    DomainError::validation(format!("unknown customer {customer_id}")).into(),
                );
            }
        }
        quotation.apply_patch(&patch, actor_id, occurred_at)?;

        let items = match &patch.items {
            Some(drafts) => {
                let (items, totals) = build_items(&tx, id, drafts, occurred_at)?;
                tx.replace_quotation_items(id, items.clone())?;
                quotation.replace_totals(totals);
                items
            }
            None => tx.quotation_items(id)?,
        };

        tx.update_quotation(quotation.clone())?;
        tx.commit()?;

        tracing::info!(quotation = %quotation.number, "quotation updated");
        Ok(QuotationDetail { quotation, items })
    }

    pub fn get(&self, actor_id: UserId, id: QuotationId) -> AppResult<QuotationDetail> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let quotation = tx.quotation(id)?.ok_or(DomainError::NotFound)?;
        let items = tx.quotation_items(id)?;
        Ok(QuotationDetail { quotation, items })
    }

    pub fn list(
        &self,
        actor_id: UserId,
        filter: QuotationFilter,
        page: Pagination,
        order: SortOrder,
    ) -> AppResult<Vec<Quotation>> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.list_quotations(&filter, page, order)?)
    }

    /// draft → pending_approval, addressed to a specific approver.
    pub fn request_approval(
        &self,
        actor_id: UserId,
        id: QuotationId,
        approver_id: UserId,
        notes: Option<String>,
    ) -> AppResult<Quotation> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::CreateQuotation)?;

        let approver = tx
            .user(approver_id)?
            .ok_or_else(|| DomainError::validation(format!("unknown approver {approver_id}")))?;
        if !may(&approver, Action::ApproveQuotation) {
            return Err(DomainError::validation(format!(
                "user {approver_id} cannot approve quotations"
            ))
            .into());
        }

        let mut quotation = tx.quotation(id)?.ok_or(DomainError::NotFound)?;
        quotation.request_approval(approver_id, notes)?;
        tx.update_quotation(quotation.clone())?;
        tx.commit()?;

        tracing::info!(quotation = %quotation.number, approver = %approver_id, "approval requested");
        Ok(quotation)
    }

    /// pending_approval → approved; the actor becomes the approver of record.
    pub fn approve(
        &self,
        actor_id: UserId,
        id: QuotationId,
        notes: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Quotation> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::ApproveQuotation)?;

        let mut quotation = tx.quotation(id)?.ok_or(DomainError::NotFound)?;
        quotation.approve(actor_id, occurred_at, notes)?;
        tx.update_quotation(quotation.clone())?;
        tx.commit()?;

        tracing::info!(quotation = %quotation.number, "quotation approved");
        Ok(quotation)
    }
}

/// Resolve item drafts into rows: quantity from the draft, unit price from
/// the draft (allows negotiated prices), tax rate read from the product now.
fn build_items<T: Transaction>(
    tx: &T,
    quotation_id: QuotationId,
    drafts: &[QuotationItemDraft],
    occurred_at: DateTime<Utc>,
) -> AppResult<(Vec<QuotationItem>, DocumentTotals)> {
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
        items.push(QuotationItem {
            id: LineItemId::new(),
            quotation_id,
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
