//! Customer entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use billflow_core::{CustomerId, DomainError, DomainResult, UserId};

/// Customer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

/// A customer row. Never hard-deleted; deactivate via `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free-form address blocks, stored as JSON like the rest of the schema.
    pub address: Option<JsonValue>,
    pub billing_address: Option<JsonValue>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub status: CustomerStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<JsonValue>,
    pub billing_address: Option<JsonValue>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub status: CustomerStatus,
    pub notes: Option<String>,
}

/// Field-by-field patch: only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<JsonValue>,
    pub billing_address: Option<JsonValue>,
    pub payment_terms: Option<String>,
    pub tax_id: Option<String>,
    pub status: Option<CustomerStatus>,
    pub notes: Option<String>,
}

impl Customer {
    pub fn create(
        id: CustomerId,
        input: NewCustomer,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.company_name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        Ok(Self {
            id,
            company_name: input.company_name.trim().to_string(),
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            billing_address: input.billing_address,
            payment_terms: input.payment_terms,
            tax_id: input.tax_id,
            status: input.status,
            notes: input.notes,
            created_at,
            created_by,
            updated_at: None,
            updated_by: None,
        })
    }

    /// Apply the provided fields, leaving absent ones untouched.
    pub fn apply_patch(
        &mut self,
        patch: CustomerPatch,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(company_name) = patch.company_name {
            if company_name.trim().is_empty() {
                return Err(DomainError::validation("company name cannot be empty"));
            }
            self.company_name = company_name.trim().to_string();
        }
        if let Some(contact_name) = patch.contact_name {
            self.contact_name = Some(contact_name);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(billing_address) = patch.billing_address {
            self.billing_address = Some(billing_address);
        }
        if let Some(payment_terms) = patch.payment_terms {
            self.payment_terms = Some(payment_terms);
        }
        if let Some(tax_id) = patch.tax_id {
            self.tax_id = Some(tax_id);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Some(updated_at);
        self.updated_by = Some(updated_by);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(name: &str) -> NewCustomer {
        NewCustomer {
            company_name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
            address: None,
            billing_address: None,
            payment_terms: None,
            tax_id: None,
            status: CustomerStatus::Active,
            notes: None,
        }
    }

    #[test]
    fn create_trims_company_name() {
        let c = Customer::create(
            CustomerId::new(),
            new_customer("  Acme Corp  "),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(c.company_name, "Acme Corp");
        assert_eq!(c.status, CustomerStatus::Active);
    }

    #[test]
    fn create_rejects_blank_company_name() {
        let err = Customer::create(
            CustomerId::new(),
            new_customer("   "),
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_records_updater() {
        let mut c = Customer::create(
            CustomerId::new(),
            new_customer("Acme"),
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        let editor = UserId::new();
        c.apply_patch(
            CustomerPatch {
                status: Some(CustomerStatus::Inactive),
                ..Default::default()
            },
            editor,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(c.status, CustomerStatus::Inactive);
        assert_eq!(c.updated_by, Some(editor));
        assert_eq!(c.company_name, "Acme");
    }
}
