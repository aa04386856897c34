//! Foundation types for the Shift ledger.
//!
//! This crate provides the value objects shared by every other Shift crate:
//! the account identity, the booking ledger, the accrual session state, and
//! the transient peer snapshots fetched from the remote service.
//!
//! # Key Types
//!
//! - [`AccountIdentity`] -- account id, referrer, display name, and balance
//! - [`AccountId`] -- opaque account identifier (UUID v7 when generated locally)
//! - [`Referrer`] -- who referred an account (self-referral or another account)
//! - [`Booking`] -- one ledger entry: description, amount, calendar date
//! - [`BookingLedger`] -- ordered sequence of bookings, newest first
//! - [`SessionState`] -- the scooping session start, or idle
//! - [`Peer`] -- read-only snapshot of another account

pub mod account;
pub mod booking;
pub mod error;
pub mod peer;
pub mod session;

pub use account::{AccountId, AccountIdentity, Referrer};
pub use booking::{Booking, BookingLedger};
pub use error::TypeError;
pub use peer::{Peer, PeerScooping};
pub use session::SessionState;
