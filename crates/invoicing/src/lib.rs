//! Invoicing domain module.
//!
//! The invoice half of the document lifecycle engine: draft →
//! pending_approval → approved → issued, plus append-only payments and the
//! derived payment status.

pub mod invoice;
pub mod payment;

pub use invoice::{
    Invoice, InvoiceItem, InvoiceItemDraft, InvoicePatch, InvoiceStatus, NewInvoice, PaymentStatus,
};
pub use payment::{NewPayment, Payment};
