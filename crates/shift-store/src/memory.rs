use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use shift_codec::DecodedChain;
use shift_types::{AccountIdentity, BookingLedger, SessionState};

use crate::error::{StoreError, StoreResult};
use crate::sealer::ChainSealer;
use crate::traits::ChainStore;

/// In-memory chain store.
///
/// Keeps the sealed bytes exactly as a file store would write them, so the
/// full codec and envelope path is exercised. Intended for tests and
/// embedding; supports one-shot save failure injection.
pub struct InMemoryChainStore {
    sealer: ChainSealer,
    sealed: Mutex<Option<Vec<u8>>>,
    fail_next_save: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::with_sealer(ChainSealer::default())
    }

    pub fn with_sealer(sealer: ChainSealer) -> Self {
        Self {
            sealer,
            sealed: Mutex::new(None),
            fail_next_save: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    /// Make the next `save` fail with `StoreError::Unavailable`.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The sealed bytes of the last successful save.
    pub fn sealed_bytes(&self) -> Option<Vec<u8>> {
        self.sealed.lock().expect("lock poisoned").clone()
    }

    /// Replace the stored bytes, e.g. with a tampered copy.
    pub fn set_sealed_bytes(&self, bytes: Vec<u8>) {
        *self.sealed.lock().expect("lock poisoned") = Some(bytes);
    }
}

impl Default for InMemoryChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore for InMemoryChainStore {
    fn exists(&self) -> StoreResult<bool> {
        Ok(self.sealed.lock().expect("lock poisoned").is_some())
    }

    fn load(&self) -> StoreResult<DecodedChain> {
        let guard = self.sealed.lock().expect("lock poisoned");
        let bytes = guard
            .as_ref()
            .ok_or_else(|| StoreError::NotFound(self.location().into()))?;
        self.sealer.open(bytes)
    }

    fn save(
        &self,
        identity: &AccountIdentity,
        ledger: &BookingLedger,
        session: SessionState,
    ) -> StoreResult<()> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        let sealed = self.sealer.seal(identity, ledger, session)?;
        *self.sealed.lock().expect("lock poisoned") = Some(sealed);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory://chain".into()
    }
}

impl std::fmt::Debug for InMemoryChainStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryChainStore")
            .field("saves", &self.save_count())
            .finish()
    }
}
