use shift_store::StoreError;
use shift_types::TypeError;

use crate::errlog::ErrorKind;

/// Errors from chain operations.
///
/// Whenever one of these is returned the in-memory chain is exactly what it
/// was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid ledger change: {0}")]
    Type(#[from] TypeError),

    /// A session is already running.
    #[error("a scooping session is already active since {since}")]
    SessionActive { since: i64 },

    #[error("booking index {index} out of range (ledger has {len})")]
    NoSuchBooking { index: usize, len: usize },
}

impl ChainError {
    /// Category this error is recorded under in the [`ErrorLog`](crate::ErrorLog),
    /// or `None` for caller mistakes that are not logged.
    pub fn log_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Store(StoreError::Format(_)) => Some(ErrorKind::Format),
            Self::Store(StoreError::Crypto(_)) => Some(ErrorKind::Crypto),
            Self::Store(_) => Some(ErrorKind::Io),
            Self::Type(TypeError::BalanceOverflow) => Some(ErrorKind::Format),
            Self::Type(_) | Self::SessionActive { .. } | Self::NoSuchBooking { .. } => None,
        }
    }
}

/// Result alias for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
