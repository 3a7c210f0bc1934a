//! Shared document mechanics for quotations and invoices.
//!
//! Two concerns live here because both document types need them identically:
//! sequential document numbering and line-item total/tax aggregation.

pub mod number;
pub mod totals;

pub use number::{next_number, DocumentKind};
pub use totals::{aggregate, line_totals, DocumentTotals, LineDraft, LineTotals};
