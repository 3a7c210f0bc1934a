//! `billflow-auth` — actor identity and the access policy boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: token
//! issuance and session mechanics live elsewhere, only the permission
//! contract is modeled here.

pub mod permissions;
pub mod policy;
pub mod user;

pub use permissions::{Action, PermissionFlags};
pub use policy::{authorize, may};
pub use user::{NewUser, User, UserPatch};
