use std::time::Duration;

use shift_ledger::{ChainError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status.
    #[error("response error from webserver: {0}")]
    Status(u16),

    /// The service answered with its error flag set.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    /// The response body was not what the protocol promises.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

impl SyncError {
    /// Category in the chain's error log. Chain errors are logged by the
    /// chain itself.
    pub fn log_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Network(_)
            | Self::Status(_)
            | Self::Timeout(_)
            | Self::Cancelled
            | Self::Decode(_) => Some(ErrorKind::Network),
            Self::Remote(_) => Some(ErrorKind::Remote),
            Self::Chain(_) => None,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
