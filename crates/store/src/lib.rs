//! Persistence gateway.
//!
//! All writes go through an explicit transaction handle: begin, perform row
//! operations, commit. Dropping the handle without committing discards every
//! pending change. The [`memory`] module provides the in-memory
//! implementation used by tests and local development.

pub mod gateway;
pub mod memory;

pub use gateway::{
    CustomerFilter, Gateway, InvoiceFilter, ProductFilter, QuotationFilter, StoreError,
    StoreResult, Transaction,
};
pub use memory::MemoryGateway;
