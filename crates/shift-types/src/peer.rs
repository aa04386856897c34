use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Scooping status of a peer as reported by the remote service.
///
/// The service either reports a precomputed flag or the raw session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerScooping {
    Active(bool),
    Since(i64),
}

impl PeerScooping {
    /// Whether the peer is scooping at `now`, given the session length.
    pub fn is_scooping(&self, now: i64, window_secs: i64) -> bool {
        match *self {
            Self::Active(flag) => flag,
            Self::Since(start) => start > 0 && now - start <= window_secs,
        }
    }
}

impl Default for PeerScooping {
    fn default() -> Self {
        Self::Active(false)
    }
}

/// Read-only snapshot of another account ("mate").
///
/// Never persisted; rebuilt on every successful fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub name: String,
    #[serde(rename = "uuid", alias = "id")]
    pub id: AccountId,
    #[serde(rename = "scooping", alias = "sessionStart", default)]
    pub scooping: PeerScooping,
}
