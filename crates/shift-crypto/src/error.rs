use thiserror::Error;

/// Errors from sealing or opening an envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("envelope too short: {0} bytes")]
    Truncated(usize),

    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u8),

    #[error("unknown envelope flags: {0:#04x}")]
    UnknownFlags(u8),

    #[error("encryption failed")]
    Encryption,

    #[error("decryption failed: ciphertext or key is invalid")]
    Decryption,

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("decompression failed: {0}")]
    Decompression(String),

    #[error("integrity check failed")]
    IntegrityMismatch,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
