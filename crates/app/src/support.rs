//! Shared helpers for the services.

use billflow_auth::User;
use billflow_core::{DomainError, UserId};
use billflow_store::Transaction;

use crate::error::AppResult;

/// Load the acting user inside the current transaction.
///
/// An unknown or inactive actor reads as a permission failure rather than
/// `NotFound`: the caller asked to act, not to look a user up.
pub(crate) fn load_actor<T: Transaction>(tx: &T, actor_id: UserId) -> AppResult<User> {
    let user = tx
        .user(actor_id)?
        .ok_or_else(|| DomainError::permission_denied(format!("unknown actor {actor_id}")))?;
    if !user.is_active {
        return Err(DomainError::permission_denied(format!("user {actor_id} is inactive")).into());
    }
    Ok(user)
}
