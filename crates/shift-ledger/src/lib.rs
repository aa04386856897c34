//! The authoritative local state of a Shift account.
//!
//! A [`Chain`] exclusively owns the account identity, the booking ledger and
//! the scooping session, and is the only thing that writes them to a
//! [`ChainStore`](shift_store::ChainStore).
//!
//! # Key Types
//!
//! - [`Chain`] -- the aggregate; every mutation persists before it commits
//! - [`MintingPolicy`] -- the lazy accrual formula and its session window
//! - [`ChainEvent`] -- change notifications, delivered over a broadcast channel
//! - [`ErrorLog`] -- append-only record of persistence and remote failures
//!
//! Accrual is computed from wall-clock time on demand. There is no timer:
//! whoever polls [`Chain::current_balance`] drives session expiry.

pub mod chain;
pub mod errlog;
pub mod error;
pub mod events;
pub mod minting;

pub use chain::Chain;
pub use errlog::{ErrorKind, ErrorLog, LoggedError};
pub use error::{ChainError, ChainResult};
pub use events::{ChainEvent, EventBus, EventStream};
pub use minting::{Accrual, MintingPolicy};
