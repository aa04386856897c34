//! Chain persistence for the Shift ledger.
//!
//! A chain store turns the in-memory account state into a single sealed
//! blob (`shift-codec` layout inside a `shift-crypto` envelope) and back.
//!
//! # Storage Backends
//!
//! All backends implement the [`ChainStore`] trait:
//!
//! - [`FileChainStore`] -- one file per account, atomic single-writer saves
//! - [`InMemoryChainStore`] -- in-process store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A load either yields fully verified state or an error; never partial data.
//! 2. Saves replace the whole file atomically (temp file + rename).
//! 3. Saves are serialized per store; two writers never interleave.
//! 4. All I/O errors are propagated with the offending path.

pub mod error;
pub mod file;
pub mod memory;
pub mod sealer;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileChainStore;
pub use memory::InMemoryChainStore;
pub use sealer::ChainSealer;
pub use traits::ChainStore;

pub use shift_codec::DecodedChain;
