use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("booking amount must be positive")]
    ZeroAmount,

    #[error("balance overflow")]
    BalanceOverflow,
}
