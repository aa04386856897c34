use std::fmt;

use serde::{Deserialize, Serialize};

/// Start of the current scooping session, in seconds since the UNIX epoch.
///
/// Zero (and any non-positive value read from storage) means idle.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(i64);

impl SessionState {
    pub const fn idle() -> Self {
        Self(0)
    }

    pub const fn started_at(unix_secs: i64) -> Self {
        Self(unix_secs)
    }

    /// Raw stored value.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    pub const fn is_active(&self) -> bool {
        self.0 > 0
    }

    /// Session start, if a session is running.
    pub const fn started(&self) -> Option<i64> {
        if self.is_active() {
            Some(self.0)
        } else {
            None
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.started() {
            Some(ts) => write!(f, "SessionState(since {ts})"),
            None => f.write_str("SessionState(idle)"),
        }
    }
}
