//! Product catalog service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use billflow_core::{DomainError, Pagination, ProductId, SortOrder, UserId};
use billflow_products::{NewProduct, Product, ProductPatch};
use billflow_store::{Gateway, ProductFilter, Transaction};

use crate::error::AppResult;
use crate::support::load_actor;

/// Product CRUD. Codes are unique across the catalog; the storage layer
/// reports a collision as `DuplicateKey`.
pub struct ProductService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> ProductService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn create(
        &self,
        actor_id: UserId,
        input: NewProduct,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Product> {
        let mut tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let product = Product::create(ProductId::new(), input, actor_id, occurred_at)?;
        tx.insert_product(product.clone())?;
        tx.commit()?;

        tracing::info!(product_id = %product.id, code = %product.code, "product created");
        Ok(product)
    }

    pub fn update(
        &self,
        actor_id: UserId,
        id: ProductId,
        patch: ProductPatch,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<Product> {
        let mut tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;

        let mut product = tx.product(id)?.ok_or(DomainError::NotFound)?;
        product.apply_patch(patch, actor_id, occurred_at)?;
        tx.update_product(product.clone())?;
        tx.commit()?;

        tracing::info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    pub fn get(&self, actor_id: UserId, id: ProductId) -> AppResult<Product> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.product(id)?.ok_or(DomainError::NotFound)?)
    }

    pub fn get_by_code(&self, actor_id: UserId, code: &str) -> AppResult<Product> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.product_by_code(code)?.ok_or(DomainError::NotFound)?)
    }

    pub fn list(
        &self,
        actor_id: UserId,
        filter: ProductFilter,
        page: Pagination,
        order: SortOrder,
    ) -> AppResult<Vec<Product>> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.list_products(&filter, page, order)?)
    }
}
