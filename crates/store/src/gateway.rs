//! Gateway and transaction traits.

use thiserror::Error;

use billflow_auth::User;
use billflow_core::{
    CustomerId, DomainError, InvoiceId, Pagination, ProductId, QuotationId, SortOrder, UserId,
};
use billflow_customers::{Customer, CustomerStatus};
use billflow_invoicing::{Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentStatus};
use billflow_products::{Product, ProductStatus};
use billflow_quotations::{Quotation, QuotationItem, QuotationStatus};

/// Storage-layer error.
///
/// Business outcomes (duplicate keys, missing rows) surface as
/// [`DomainError`]; `Unavailable` covers the backend itself failing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional predicates for customer scans.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub status: Option<CustomerStatus>,
}

/// Optional predicates for product scans.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
}

/// Optional predicates for quotation scans.
#[derive(Debug, Clone, Default)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub customer_id: Option<CustomerId>,
}

/// Optional predicates for invoice scans.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<CustomerId>,
}

/// Entry point into storage. Every unit of work runs inside one transaction.
pub trait Gateway {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self) -> StoreResult<Self::Tx<'_>>;
}

/// One transaction: a consistent view plus pending writes.
///
/// Row operations validate uniqueness (user email, product code, document
/// number) and report violations as [`DomainError::DuplicateKey`]. Nothing
/// becomes visible to other transactions until [`commit`](Self::commit);
/// dropping the handle rolls everything back.
///
/// Scans are ordered by creation time and paginated; filters narrow them
/// before pagination applies.
pub trait Transaction {
    // --- users ---
    fn insert_user(&mut self, user: User) -> StoreResult<()>;
    fn update_user(&mut self, user: User) -> StoreResult<()>;
    fn user(&self, id: UserId) -> StoreResult<Option<User>>;
    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn list_users(&self, page: Pagination, order: SortOrder) -> StoreResult<Vec<User>>;

    // --- customers ---
    fn insert_customer(&mut self, customer: Customer) -> StoreResult<()>;
    fn update_customer(&mut self, customer: Customer) -> StoreResult<()>;
    fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    fn list_customers(
        &self,
        filter: &CustomerFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Customer>>;

    // --- products ---
    fn insert_product(&mut self, product: Product) -> StoreResult<()>;
    fn update_product(&mut self, product: Product) -> StoreResult<()>;
    fn product(&self, id: ProductId) -> StoreResult<Option<Product>>;
    fn product_by_code(&self, code: &str) -> StoreResult<Option<Product>>;
    fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Product>>;

    // --- quotations ---
    fn insert_quotation(
        &mut self,
        quotation: Quotation,
        items: Vec<QuotationItem>,
    ) -> StoreResult<()>;
    fn update_quotation(&mut self, quotation: Quotation) -> StoreResult<()>;
    fn quotation(&self, id: QuotationId) -> StoreResult<Option<Quotation>>;
    /// Number of the most recently created quotation, if any.
    fn latest_quotation_number(&self) -> StoreResult<Option<String>>;
    fn quotation_items(&self, id: QuotationId) -> StoreResult<Vec<QuotationItem>>;
    /// Delete all existing item rows for the quotation and write the new set.
    fn replace_quotation_items(
        &mut self,
        id: QuotationId,
        items: Vec<QuotationItem>,
    ) -> StoreResult<()>;
    fn list_quotations(
        &self,
        filter: &QuotationFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Quotation>>;

    // --- invoices ---
    fn insert_invoice(&mut self, invoice: Invoice, items: Vec<InvoiceItem>) -> StoreResult<()>;
    fn update_invoice(&mut self, invoice: Invoice) -> StoreResult<()>;
    fn invoice(&self, id: InvoiceId) -> StoreResult<Option<Invoice>>;
    /// Number of the most recently created invoice, if any.
    fn latest_invoice_number(&self) -> StoreResult<Option<String>>;
    fn invoice_items(&self, id: InvoiceId) -> StoreResult<Vec<InvoiceItem>>;
    /// Delete all existing item rows for the invoice and write the new set.
    fn replace_invoice_items(&mut self, id: InvoiceId, items: Vec<InvoiceItem>)
    -> StoreResult<()>;
    fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Invoice>>;

    // --- payments ---
    fn insert_payment(&mut self, payment: Payment) -> StoreResult<()>;
    /// Payments for one invoice, oldest first.
    fn payments(&self, invoice_id: InvoiceId) -> StoreResult<Vec<Payment>>;

    /// Make every pending write visible atomically.
    fn commit(self) -> StoreResult<()>;
}
