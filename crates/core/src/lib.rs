//! `billflow-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod query;

pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, InvoiceId, LineItemId, PaymentId, ProductId, QuotationId, UserId};
pub use query::{Pagination, SortOrder};
