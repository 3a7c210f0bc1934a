//! Payments, append-only children of an invoice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billflow_core::{DomainError, DomainResult, InvoiceId, PaymentId, UserId};

/// A received payment. Never updated or deleted once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    /// Free-form method, e.g. "bank_transfer", "credit_card".
    pub method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

/// Input for registering a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    pub method: String,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

impl Payment {
    pub fn create(
        id: PaymentId,
        invoice_id: InvoiceId,
        input: NewPayment,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.amount <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "payment amount must be positive, got {}",
                input.amount
            )));
        }
        if input.method.trim().is_empty() {
            return Err(DomainError::validation("payment method cannot be empty"));
        }
        Ok(Self {
            id,
            invoice_id,
            payment_date: input.payment_date,
            amount: input.amount,
            method: input.method,
            reference_number: input.reference_number,
            notes: input.notes,
            created_at,
            created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_payment(amount: Decimal) -> NewPayment {
        NewPayment {
            payment_date: Utc::now(),
            amount,
            method: "bank_transfer".to_string(),
            reference_number: None,
            notes: None,
        }
    }

    #[test]
    fn create_payment_success() {
        let p = Payment::create(
            PaymentId::new(),
            InvoiceId::new(),
            new_payment(dec!(50.00)),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(p.amount, dec!(50.00));
    }

    #[test]
    fn zero_or_negative_amount_is_rejected() {
        for amount in [dec!(0), dec!(-10)] {
            let err = Payment::create(
                PaymentId::new(),
                InvoiceId::new(),
                new_payment(amount),
                UserId::new(),
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn blank_method_is_rejected() {
        let mut input = new_payment(dec!(10));
        input.method = "  ".to_string();
        let err = Payment::create(
            PaymentId::new(),
            InvoiceId::new(),
            input,
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
