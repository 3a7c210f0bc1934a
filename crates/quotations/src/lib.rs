//! Quotations domain module.
//!
//! The quotation half of the document lifecycle engine: draft →
//! pending_approval → approved, with wholesale item replacement while draft.

pub mod quotation;

pub use quotation::{
    NewQuotation, Quotation, QuotationItem, QuotationItemDraft, QuotationPatch, QuotationStatus,
};
