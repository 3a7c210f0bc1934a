//! Application-layer error.

use thiserror::Error;

use billflow_core::DomainError;
use billflow_store::StoreError;

/// Outcome of an application service call.
///
/// Business outcomes stay [`DomainError`]; `Unavailable` is the storage
/// backend itself failing.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(domain) => Self::Domain(domain),
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
        }
    }
}

impl AppError {
    /// The domain outcome, if this is one. Test convenience.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(domain) => Some(domain),
            Self::Unavailable(_) => None,
        }
    }
}
