//! Customers domain module.
//!
//! Pure entity logic for the customer directory; no IO, no HTTP, no storage.

pub mod customer;

pub use customer::{Customer, CustomerPatch, CustomerStatus, NewCustomer};
