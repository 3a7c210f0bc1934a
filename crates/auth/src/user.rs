//! User entity.
//!
//! Users are actors: billing documents reference them as creators and
//! approvers, and their permission flags feed the access policy. Password
//! hashing and token issuance are out of scope here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billflow_core::{DomainError, DomainResult, UserId};

use crate::permissions::PermissionFlags;

/// A user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub permissions: PermissionFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub permissions: PermissionFlags,
}

/// Field-by-field patch: only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub permissions: Option<PermissionFlags>,
}

impl User {
    pub fn create(id: UserId, input: NewUser, created_at: DateTime<Utc>) -> DomainResult<Self> {
        let email = normalize_email(&input.email)?;
        Ok(Self {
            id,
            email,
            first_name: input.first_name,
            last_name: input.last_name,
            department: input.department,
            position: input.position,
            phone: input.phone,
            is_active: input.is_active,
            permissions: input.permissions,
            created_at,
            updated_at: None,
        })
    }

    /// Apply the provided fields, leaving absent ones untouched.
    pub fn apply_patch(&mut self, patch: UserPatch, updated_at: DateTime<Utc>) -> DomainResult<()> {
        if let Some(email) = patch.email {
            self.email = normalize_email(&email)?;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(department) = patch.department {
            self.department = Some(department);
        }
        if let Some(position) = patch.position {
            self.position = Some(position);
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        self.updated_at = Some(updated_at);
        Ok(())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            department: None,
            position: None,
            phone: None,
            is_active: true,
            permissions: PermissionFlags::default(),
        }
    }

    #[test]
    fn create_normalizes_email() {
        let user = User::create(UserId::new(), new_user("  Alice@Example.COM "), Utc::now()).unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn create_rejects_malformed_email() {
        let err = User::create(UserId::new(), new_user("not-an-email"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut user = User::create(UserId::new(), new_user("a@b.example"), Utc::now()).unwrap();
        let patch = UserPatch {
            phone: Some("555-0100".to_string()),
            is_active: Some(false),
            ..Default::default()
        };
        user.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert!(!user.is_active);
        assert_eq!(user.email, "a@b.example");
        assert!(user.updated_at.is_some());
    }
}
