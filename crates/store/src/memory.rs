//! In-memory gateway.
//!
//! Intended for tests/dev. A transaction clones the whole state, applies its
//! writes to the clone, and swaps the clone back in on commit. The write lock
//! is held for the lifetime of the transaction, so readers always observe a
//! committed state and writers serialize.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockWriteGuard};

use billflow_auth::User;
use billflow_core::{
    CustomerId, DomainError, InvoiceId, Pagination, ProductId, QuotationId, SortOrder, UserId,
};
use billflow_customers::Customer;
use billflow_invoicing::{Invoice, InvoiceItem, Payment};
use billflow_products::Product;
use billflow_quotations::{Quotation, QuotationItem};

use crate::gateway::{
    CustomerFilter, Gateway, InvoiceFilter, ProductFilter, QuotationFilter, StoreError,
    StoreResult, Transaction,
};

/// Id-keyed table that remembers insertion order for creation-time scans.
#[derive(Debug, Clone)]
struct Table<K, V> {
    order: Vec<K>,
    rows: HashMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, V: Clone> Table<K, V> {
    fn insert(&mut self, key: K, row: V) {
        self.order.push(key);
        self.rows.insert(key, row);
    }

    /// Replace an existing row in place. Returns false when the key is absent.
    fn replace(&mut self, key: K, row: V) -> bool {
        match self.rows.get_mut(&key) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.rows.get(key)
    }

    fn values(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|k| self.rows.get(k))
    }

    fn last(&self) -> Option<&V> {
        self.order.last().and_then(|k| self.rows.get(k))
    }

    /// Filtered, ordered, paginated scan over the rows.
    fn scan<F>(&self, order: SortOrder, page: Pagination, mut pred: F) -> Vec<V>
    where
        F: FnMut(&V) -> bool,
    {
        let matching: Vec<&V> = match order {
            SortOrder::Asc => self.values().filter(|v| pred(v)).collect(),
            SortOrder::Desc => self
                .order
                .iter()
                .rev()
                .filter_map(|k| self.rows.get(k))
                .filter(|v| pred(v))
                .collect(),
        };
        matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect()
    }
}

/// Everything the gateway holds, cloned wholesale per transaction.
#[derive(Debug, Clone, Default)]
struct StoreState {
    users: Table<UserId, User>,
    customers: Table<CustomerId, Customer>,
    products: Table<ProductId, Product>,
    quotations: Table<QuotationId, Quotation>,
    quotation_items: HashMap<QuotationId, Vec<QuotationItem>>,
    invoices: Table<InvoiceId, Invoice>,
    invoice_items: HashMap<InvoiceId, Vec<InvoiceItem>>,
    payments: HashMap<InvoiceId, Vec<Payment>>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: RwLock<StoreState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Gateway for MemoryGateway {
    type Tx<'a> = MemoryTx<'a>;

    fn begin(&self) -> StoreResult<MemoryTx<'_>> {
        let guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }
}

/// An open transaction against [`MemoryGateway`].
pub struct MemoryTx<'a> {
    guard: RwLockWriteGuard<'a, StoreState>,
    working: StoreState,
}

impl MemoryTx<'_> {
    fn ensure_unique_email(&self, email: &str, except: UserId) -> StoreResult<()> {
        let taken = self
            .working
            .users
            .values()
            .any(|u| u.id != except && u.email == email);
        if taken {
            return Err(DomainError::duplicate_key(format!("user email {email}")).into());
        }
        Ok(())
    }

    fn ensure_unique_product_code(&self, code: &str, except: ProductId) -> StoreResult<()> {
        let taken = self
            .working
            .products
            .values()
            .any(|p| p.id != except && p.code == code);
        if taken {
            return Err(DomainError::duplicate_key(format!("product code {code}")).into());
        }
        Ok(())
    }
}

impl Transaction for MemoryTx<'_> {
    fn insert_user(&mut self, user: User) -> StoreResult<()> {
        self.ensure_unique_email(&user.email, user.id)?;
        self.working.users.insert(user.id, user);
        Ok(())
    }

    fn update_user(&mut self, user: User) -> StoreResult<()> {
        self.ensure_unique_email(&user.email, user.id)?;
        if !self.working.users.replace(user.id, user) {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list_users(&self, page: Pagination, order: SortOrder) -> StoreResult<Vec<User>> {
        Ok(self.working.users.scan(order, page, |_| true))
    }

    fn insert_customer(&mut self, customer: Customer) -> StoreResult<()> {
        self.working.customers.insert(customer.id, customer);
        Ok(())
    }

    fn update_customer(&mut self, customer: Customer) -> StoreResult<()> {
        if !self.working.customers.replace(customer.id, customer) {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.working.customers.get(&id).cloned())
    }

    fn list_customers(
        &self,
        filter: &CustomerFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Customer>> {
        Ok(self.working.customers.scan(order, page, |c| {
            filter.status.is_none_or(|s| c.status == s)
        }))
    }

    fn insert_product(&mut self, product: Product) -> StoreResult<()> {
        self.ensure_unique_product_code(&product.code, product.id)?;
        self.working.products.insert(product.id, product);
        Ok(())
    }

    fn update_product(&mut self, product: Product) -> StoreResult<()> {
        self.ensure_unique_product_code(&product.code, product.id)?;
        if !self.working.products.replace(product.id, product) {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    fn product_by_code(&self, code: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .working
            .products
            .values()
            .find(|p| p.code == code)
            .cloned())
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Product>> {
        Ok(self.working.products.scan(order, page, |p| {
            filter.status.is_none_or(|s| p.status == s)
                && filter
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category.as_deref() == Some(c))
        }))
    }

    fn insert_quotation(
        &mut self,
        quotation: Quotation,
        items: Vec<QuotationItem>,
    ) -> StoreResult<()> {
        if self
            .working
            .quotations
            .values()
            .any(|q| q.number == quotation.number)
        {
            return Err(
                DomainError::duplicate_key(format!("quotation number {}", quotation.number))
                    .into(),
            );
        }
        self.working.quotation_items.insert(quotation.id, items);
        self.working.quotations.insert(quotation.id, quotation);
        Ok(())
    }

    fn update_quotation(&mut self, quotation: Quotation) -> StoreResult<()> {
        if !self.working.quotations.replace(quotation.id, quotation) {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn quotation(&self, id: QuotationId) -> StoreResult<Option<Quotation>> {
        Ok(self.working.quotations.get(&id).cloned())
    }

    fn latest_quotation_number(&self) -> StoreResult<Option<String>> {
        Ok(self.working.quotations.last().map(|q| q.number.clone()))
    }

    fn quotation_items(&self, id: QuotationId) -> StoreResult<Vec<QuotationItem>> {
        Ok(self
            .working
            .quotation_items
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_quotation_items(
        &mut self,
        id: QuotationId,
        items: Vec<QuotationItem>,
    ) -> StoreResult<()> {
        if self.working.quotations.get(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        self.working.quotation_items.insert(id, items);
        Ok(())
    }

    fn list_quotations(
        &self,
        filter: &QuotationFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Quotation>> {
        Ok(self.working.quotations.scan(order, page, |q| {
            filter.status.is_none_or(|s| q.status == s)
                && filter.customer_id.is_none_or(|c| q.customer_id == c)
        }))
    }

    fn insert_invoice(&mut self, invoice: Invoice, items: Vec<InvoiceItem>) -> StoreResult<()> {
        if self
            .working
            .invoices
            .values()
            .any(|i| i.number == invoice.number)
        {
            return Err(
                DomainError::duplicate_key(format!("invoice number {}", invoice.number)).into(),
            );
        }
        self.working.invoice_items.insert(invoice.id, items);
        self.working.invoices.insert(invoice.id, invoice);
        Ok(())
    }

    fn update_invoice(&mut self, invoice: Invoice) -> StoreResult<()> {
        if !self.working.invoices.replace(invoice.id, invoice) {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    fn invoice(&self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        Ok(self.working.invoices.get(&id).cloned())
    }

    fn latest_invoice_number(&self) -> StoreResult<Option<String>> {
        Ok(self.working.invoices.last().map(|i| i.number.clone()))
    }

    fn invoice_items(&self, id: InvoiceId) -> StoreResult<Vec<InvoiceItem>> {
        Ok(self
            .working
            .invoice_items
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_invoice_items(
        &mut self,
        id: InvoiceId,
        items: Vec<InvoiceItem>,
    ) -> StoreResult<()> {
        if self.working.invoices.get(&id).is_none() {
            return Err(DomainError::not_found().into());
        }
        self.working.invoice_items.insert(id, items);
        Ok(())
    }

    fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: Pagination,
        order: SortOrder,
    ) -> StoreResult<Vec<Invoice>> {
        Ok(self.working.invoices.scan(order, page, |i| {
            filter.status.is_none_or(|s| i.status == s)
                && filter.payment_status.is_none_or(|s| i.payment_status == s)
                && filter.customer_id.is_none_or(|c| i.customer_id == c)
        }))
    }

    fn insert_payment(&mut self, payment: Payment) -> StoreResult<()> {
        if self.working.invoices.get(&payment.invoice_id).is_none() {
            return Err(DomainError::not_found().into());
        }
        self.working
            .payments
            .entry(payment.invoice_id)
            .or_default()
            .push(payment);
        Ok(())
    }

    fn payments(&self, invoice_id: InvoiceId) -> StoreResult<Vec<Payment>> {
        Ok(self
            .working
            .payments
            .get(&invoice_id)
            .cloned()
            .unwrap_or_default())
    }

    fn commit(mut self) -> StoreResult<()> {
        *self.guard = self.working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billflow_auth::{NewUser, PermissionFlags};
    use billflow_customers::{CustomerStatus, NewCustomer};
    use billflow_documents::DocumentTotals;
    use billflow_quotations::NewQuotation;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn user(email: &str) -> User {
        User::create(
            UserId::new(),
            NewUser {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                department: None,
                position: None,
                phone: None,
                is_active: true,
                permissions: PermissionFlags::default(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn customer(name: &str) -> Customer {
        Customer::create(
            CustomerId::new(),
            NewCustomer {
                company_name: name.to_string(),
                contact_name: None,
                email: None,
                phone: None,
                address: None,
                billing_address: None,
                payment_terms: None,
                tax_id: None,
                status: CustomerStatus::Active,
                notes: None,
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    fn quotation(number: &str) -> Quotation {
        let input = NewQuotation {
            quotation_date: Utc::now(),
            expiration_date: None,
            customer_id: CustomerId::new(),
            notes: None,
            items: vec![],
        };
        Quotation::create(
            QuotationId::new(),
            number.to_string(),
            &input,
            DocumentTotals {
                subtotal: dec!(100),
                tax_amount: dec!(10),
                total_amount: dec!(110),
            },
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn committed_writes_are_visible_to_later_transactions() {
        let gw = MemoryGateway::new();
        let u = user("a@example.com");
        let id = u.id;

        let mut tx = gw.begin().unwrap();
        tx.insert_user(u).unwrap();
        tx.commit().unwrap();

        let tx = gw.begin().unwrap();
        assert!(tx.user(id).unwrap().is_some());
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let gw = MemoryGateway::new();
        let u = user("a@example.com");
        let id = u.id;

        {
            let mut tx = gw.begin().unwrap();
            tx.insert_user(u).unwrap();
            // no commit
        }

        let tx = gw.begin().unwrap();
        assert!(tx.user(id).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();
        tx.insert_user(user("dup@example.com")).unwrap();

        let err = tx.insert_user(user("dup@example.com")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::DuplicateKey(_))
        ));
    }

    #[test]
    fn duplicate_document_number_is_rejected() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();
        tx.insert_quotation(quotation("Q-0001"), vec![]).unwrap();

        let err = tx.insert_quotation(quotation("Q-0001"), vec![]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::DuplicateKey(_))
        ));
    }

    #[test]
    fn latest_number_follows_creation_order() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();
        assert_eq!(tx.latest_quotation_number().unwrap(), None);

        tx.insert_quotation(quotation("Q-0001"), vec![]).unwrap();
        tx.insert_quotation(quotation("Q-0002"), vec![]).unwrap();
        assert_eq!(
            tx.latest_quotation_number().unwrap().as_deref(),
            Some("Q-0002")
        );
    }

    #[test]
    fn scans_are_filtered_ordered_and_paginated() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();

        let mut ids = Vec::new();
        for i in 0..5 {
            let c = customer(&format!("Company {i}"));
            ids.push(c.id);
            tx.insert_customer(c).unwrap();
        }

        // Default order is newest first.
        let page = tx
            .list_customers(
                &CustomerFilter::default(),
                Pagination {
                    offset: 0,
                    limit: 2,
                },
                SortOrder::Desc,
            )
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[4]);
        assert_eq!(page[1].id, ids[3]);

        // Offset into the ascending scan.
        let page = tx
            .list_customers(
                &CustomerFilter::default(),
                Pagination {
                    offset: 3,
                    limit: 10,
                },
                SortOrder::Asc,
            )
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[3]);
    }

    #[test]
    fn status_filter_narrows_customer_scan() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();

        let mut inactive = customer("Gone Inc");
        inactive.status = CustomerStatus::Inactive;
        tx.insert_customer(inactive).unwrap();
        tx.insert_customer(customer("Here Ltd")).unwrap();

        let actives = tx
            .list_customers(
                &CustomerFilter {
                    status: Some(CustomerStatus::Active),
                },
                Pagination::default(),
                SortOrder::Desc,
            )
            .unwrap();
        assert_eq!(actives.len(), 1);
        assert_eq!(actives[0].company_name, "Here Ltd");
    }

    #[test]
    fn replace_items_overwrites_the_whole_set() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();

        let q = quotation("Q-0001");
        let qid = q.id;
        let item = QuotationItem {
            id: billflow_core::LineItemId::new(),
            quotation_id: qid,
            product_id: ProductId::new(),
            quantity: 1,
            unit_price: dec!(10),
            subtotal: dec!(10),
            tax_rate: dec!(0.1),
            tax_amount: dec!(1),
            total_amount: dec!(11),
            description: None,
            sort_order: 0,
            created_at: Utc::now(),
        };
        tx.insert_quotation(q, vec![item.clone()]).unwrap();
        assert_eq!(tx.quotation_items(qid).unwrap().len(), 1);

        tx.replace_quotation_items(qid, vec![]).unwrap();
        assert!(tx.quotation_items(qid).unwrap().is_empty());

        let err = tx
            .replace_quotation_items(QuotationId::new(), vec![item])
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
    }

    #[test]
    fn payment_requires_existing_invoice() {
        let gw = MemoryGateway::new();
        let mut tx = gw.begin().unwrap();

        let payment = Payment::create(
            billflow_core::PaymentId::new(),
            InvoiceId::new(),
            billflow_invoicing::NewPayment {
                payment_date: Utc::now(),
                amount: dec!(10),
                method: "cash".to_string(),
                reference_number: None,
                notes: None,
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        let err = tx.insert_payment(payment).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound)));
    }
}
