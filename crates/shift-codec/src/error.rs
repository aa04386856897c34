use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("bad file format: {0}")]
    BadFileFormat(String),

    #[error("unsupported chain version: {0}")]
    UnsupportedVersion(u16),

    #[error("{what} too large to encode: {len}")]
    TooLarge { what: &'static str, len: usize },
}

impl CodecError {
    pub(crate) fn bad(reason: impl Into<String>) -> Self {
        Self::BadFileFormat(reason.into())
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
