use std::path::PathBuf;

use shift_codec::CodecError;
use shift_crypto::CryptoError;

/// Errors from chain store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No chain has been written yet.
    #[error("chain not found: {0}")]
    NotFound(PathBuf),

    /// I/O error from the underlying file, with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decrypted chain is not a valid chain.
    #[error("format error: {0}")]
    Format(#[from] CodecError),

    /// The envelope could not be opened or sealed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
