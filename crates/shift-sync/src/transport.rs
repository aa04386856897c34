use async_trait::async_trait;
use shift_types::{AccountId, AccountIdentity, Peer, SessionState};

use crate::error::SyncResult;

/// Transport interface for the Shift remote service.
///
/// Implementations report transport failures as network-class errors and an
/// answer with the error flag set as `SyncError::Remote`.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn register(&self, identity: &AccountIdentity) -> SyncResult<()>;
    async fn set_scooping(&self, id: &AccountId, session: SessionState) -> SyncResult<()>;
    async fn message(&self, name: &str) -> SyncResult<String>;
    async fn mates(&self, id: &AccountId) -> SyncResult<Vec<Peer>>;
}
