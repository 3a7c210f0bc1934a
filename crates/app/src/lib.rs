//! Application services.
//!
//! One service per entity family. Each operation opens a gateway transaction,
//! loads the acting user inside it, checks the access policy, performs the
//! domain operation and commits. Any error drops the transaction, so partial
//! writes never become visible.

pub mod customers;
pub mod error;
pub mod invoices;
pub mod products;
pub mod quotations;
pub mod users;

mod support;


pub use customers::CustomerService;
pub use error::{AppError, AppResult};
pub use invoices::{InvoiceDetail, InvoiceService};
pub use products::ProductService;
pub use quotations::{QuotationDetail, QuotationService};
pub use users::UserService;
