//! Permission flags and the actions they gate.

use serde::{Deserialize, Serialize};

/// The seven independent boolean permission flags carried by every user.
///
/// Flags are additive with no hierarchy: holding `admin` does not imply any
/// lifecycle flag, and a user may hold any combination including none.
/// `manage_order` is carried for schema fidelity but gates no lifecycle
/// action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub create_quote: bool,
    #[serde(default)]
    pub approve_quote: bool,
    #[serde(default)]
    pub manage_order: bool,
    #[serde(default)]
    pub create_invoice: bool,
    #[serde(default)]
    pub approve_invoice: bool,
    #[serde(default)]
    pub manage_revenue: bool,
}

impl PermissionFlags {
    /// All flags granted. Test/bootstrap convenience.
    pub fn all() -> Self {
        Self {
            admin: true,
            create_quote: true,
            approve_quote: true,
            manage_order: true,
            create_invoice: true,
            approve_invoice: true,
            manage_revenue: true,
        }
    }
}

/// A guarded action at the application boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateQuotation,
    ApproveQuotation,
    CreateInvoice,
    ApproveInvoice,
    ManageRevenue,
    /// User administration (create/update users).
    ManageUsers,
}
