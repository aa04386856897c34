use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shift_codec::DecodedChain;
use shift_types::{AccountIdentity, BookingLedger, SessionState};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::sealer::ChainSealer;
use crate::traits::ChainStore;

/// Well-known file name of the chain inside an application data directory.
pub const CHAIN_FILE_NAME: &str = "shift.db";

/// Chain stored in a single file.
///
/// Every save writes a complete sealed chain to a temporary file next to the
/// target, syncs it, and renames it over the target. A mutex serializes saves
/// from this process, so overlapping saves cannot interleave.
pub struct FileChainStore {
    path: PathBuf,
    sealer: ChainSealer,
    write_lock: Mutex<()>,
}

impl FileChainStore {
    pub fn new(path: impl Into<PathBuf>, sealer: ChainSealer) -> Self {
        Self {
            path: path.into(),
            sealer,
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/shift.db`.
    pub fn in_dir(dir: impl AsRef<Path>, sealer: ChainSealer) -> Self {
        Self::new(dir.as_ref().join(CHAIN_FILE_NAME), sealer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(&self, bytes: &[u8]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}

impl ChainStore for FileChainStore {
    fn exists(&self) -> StoreResult<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    fn load(&self) -> StoreResult<DecodedChain> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let chain = self.sealer.open(&bytes)?;
        debug!(
            path = %self.path.display(),
            bookings = chain.ledger.count(),
            "loaded chain"
        );
        Ok(chain)
    }

    fn save(
        &self,
        identity: &AccountIdentity,
        ledger: &BookingLedger,
        session: SessionState,
    ) -> StoreResult<()> {
        let sealed = self.sealer.seal(identity, ledger, session)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("chain write lock poisoned".into()))?;
        self.write_atomically(&sealed)?;
        info!(
            path = %self.path.display(),
            bytes = sealed.len(),
            bookings = ledger.count(),
            "chain saved"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

impl std::fmt::Debug for FileChainStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileChainStore")
            .field("path", &self.path)
            .finish()
    }
}
