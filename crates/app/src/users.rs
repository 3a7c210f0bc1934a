//! User administration service.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use billflow_auth::{authorize, Action, NewUser, User, UserPatch};
use billflow_core::{DomainError, Pagination, SortOrder, UserId};
use billflow_store::{Gateway, Transaction};

use crate::error::AppResult;
use crate::support::load_actor;

/// Creating and updating users requires the `admin` flag; reads only require
/// an active actor. Email uniqueness is enforced by the storage layer.
pub struct UserService<G> {
    gateway: Arc<G>,
}

impl<G: Gateway> UserService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub fn create(
        &self,
        actor_id: UserId,
        input: NewUser,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<User> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::ManageUsers)?;

        let user = User::create(UserId::new(), input, occurred_at)?;
        tx.insert_user(user.clone())?;
        tx.commit()?;

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    pub fn update(
        &self,
        actor_id: UserId,
        id: UserId,
        patch: UserPatch,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<User> {
        let mut tx = self.gateway.begin()?;
        let actor = load_actor(&tx, actor_id)?;
        authorize(&actor, Action::ManageUsers)?;

        let mut user = tx.user(id)?.ok_or(DomainError::NotFound)?;
        user.apply_patch(patch, occurred_at)?;
        tx.update_user(user.clone())?;
        tx.commit()?;

        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub fn get(&self, actor_id: UserId, id: UserId) -> AppResult<User> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.user(id)?.ok_or(DomainError::NotFound)?)
    }

    pub fn list(
        &self,
        actor_id: UserId,
        page: Pagination,
        order: SortOrder,
    ) -> AppResult<Vec<User>> {
        let tx = self.gateway.begin()?;
        load_actor(&tx, actor_id)?;
        Ok(tx.list_users(page, order)?)
    }
}
