//! Customer directory service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use billflow_core::{CustomerId, DomainError, Pagination, SortOrder, UserId};
use billflow_customers::{Customer, CustomerPatch, NewCustomer};
use billflow_store::{CustomerFilter, Gateway, Transaction};

use crate::error::AppResult;
use crate::support::load_actor;

/// Customer CRUD. No dedicated permission flag; any active user may manage
/// the directory. Customers are never hard-deleted, only set inactive.
pub struct CustomerService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> CustomerService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn create(
        &self,
        actor_id: UserId,
        input: NewCustomer,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Customer> {
        let mut tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let customer = Customer::create(CustomerId::new(), input, actor_id, occurred_at)?;
        tx.insert_customer(customer.clone())?;
        tx.commit()?;

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub fn update(
        &self,
        actor_id: UserId,
        id: CustomerId,
        patch: CustomerPatch,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Customer> {
        let mut tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let mut customer = tx.customer(id)?.ok_or(DomainError::NotFound)?;
        customer.apply_patch(patch, actor_id, occurred_at)?;
        tx.update_customer(customer.clone())?;
        tx.commit()?;

        tracing::info!(customer_id = %customer.id, "customer updated");
        Ok(customer)
    }

    pub fn get(&self, actor_id: UserId, id: CustomerId) -> AppResult<Customer> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.customer(id)?.ok_or(DomainError::NotFound)?)
    }

    pub fn list(
        &self,
        actor_id: UserId,
        filter: CustomerFilter,
        page: Pagination,
        order: SortOrder,
    ) -> AppResult<Vec<Customer>> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.list_customers(&filter, page, order)?)
    }
}
