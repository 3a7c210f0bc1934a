//! Products domain module.
//!
//! Catalog entities whose unit price and tax rate are snapshotted onto
//! document line items at creation/update time.

pub mod product;

pub use product::{NewProduct, Product, ProductPatch, ProductStatus};
