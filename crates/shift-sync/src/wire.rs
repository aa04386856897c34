//! JSON bodies exchanged with the remote service.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

pub const REGISTER: &str = "register";
pub const SET_SCOOPING: &str = "setscooping";
pub const MESSAGE: &str = "message";
pub const MATE_LIST: &str = "matelist";

/// The service expects the test flag as a string.
pub fn test_flag(test: bool) -> &'static str {
    if test {
        "true"
    } else {
        "false"
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub uuid: &'a str,
    pub ruuid: &'a str,
    pub country: &'a str,
    pub language: &'a str,
    pub test: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SetScoopingRequest<'a> {
    pub key: &'a str,
    pub uuid: &'a str,
    pub scooping: i64,
    pub test: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub test: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MateListRequest<'a> {
    pub key: &'a str,
    pub uuid: &'a str,
    pub test: &'static str,
}

/// Common response envelope: an error flag, a human-readable message, and
/// an optional payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub is_error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// The payload, or `SyncError::Remote` if the error flag is set.
    pub fn into_data(self) -> SyncResult<Option<T>> {
        if self.is_error {
            let message = if self.message.is_empty() {
                "unspecified remote error".to_string()
            } else {
                self.message
            };
            return Err(SyncError::Remote(message));
        }
        Ok(self.data)
    }
}
