//! Remote sync for the Shift ledger.
//!
//! The remote service is advisory: it learns about new accounts and session
//! starts, and serves a welcome message and the list of referred peers. It is
//! never a source of truth for the balance.
//!
//! # Architecture
//!
//! - [`RemoteService`] -- async transport trait, one method per endpoint
//! - [`HttpRemote`] -- JSON-over-HTTP implementation using `reqwest`
//! - [`SyncClient`] -- drives a [`Chain`](shift_ledger::Chain) through the
//!   remote calls, bounding each with a timeout and a [`CancelHandle`]
//!
//! Failures of the remote never roll back local state. They are appended to
//! the chain's error log and returned to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod wire;

pub use client::{CancelHandle, SyncClient, DEFAULT_MESSAGE};
pub use config::RemoteConfig;
pub use error::{SyncError, SyncResult};
pub use http::HttpRemote;
pub use transport::RemoteService;
