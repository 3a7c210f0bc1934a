//! Access policy: maps permission flags to allowed actions.

use billflow_core::{DomainError, DomainResult};

use crate::permissions::Action;
use crate::user::User;

/// Whether `user` may perform `action`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Flags are independent and additive; `admin` only gates administration and
/// never stands in for a lifecycle flag. Inactive users may do nothing.
pub fn may(user: &User, action: Action) -> bool {
    if !user.is_active {
        return false;
    }

    let p = &user.permissions;
    match action {
        Action::CreateQuotation => p.create_quote,
        Action::ApproveQuotation => p.approve_quote,
        Action::CreateInvoice => p.create_invoice,
        Action::ApproveInvoice => p.approve_invoice,
        Action::ManageRevenue => p.manage_revenue,
        Action::ManageUsers => p.admin,
    }
}

/// Enforce `may`, surfacing a denial as a `PermissionDenied` outcome.
pub fn authorize(user: &User, action: Action) -> DomainResult<()> {
    if may(user, action) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(format!(
            "user {} may not {:?}",
            user.id, action
        )))
    }
}
