use shift_codec::DecodedChain;
use shift_types::{AccountIdentity, BookingLedger, SessionState};

use crate::error::StoreResult;

/// Persistent home of a single chain.
///
/// All implementations must satisfy these invariants:
/// - `load` returns only state whose envelope and format were fully verified.
/// - `save` replaces the previous chain as a whole; readers never observe a
///   half-written chain.
/// - Concurrent `save` calls are serialized.
pub trait ChainStore: Send + Sync {
    /// Whether a chain has been saved before.
    fn exists(&self) -> StoreResult<bool>;

    /// Read, open, and decode the chain.
    ///
    /// Returns `StoreError::NotFound` when nothing has been saved.
    fn load(&self) -> StoreResult<DecodedChain>;

    /// Encode, seal, and write the chain.
    fn save(
        &self,
        identity: &AccountIdentity,
        ledger: &BookingLedger,
        session: SessionState,
    ) -> StoreResult<()>;

    /// Human-readable location for diagnostics.
    fn location(&self) -> String;
}
