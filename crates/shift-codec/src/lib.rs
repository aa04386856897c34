//! Binary chain format for the Shift ledger.
//!
//! The chain is the single persisted record of an account: session start,
//! identity fields, and the ordered booking ledger. This crate only turns
//! those values into bytes and back; encryption lives in `shift-crypto`.
//!
//! # Layout (all integers big-endian)
//!
//! ```text
//! u16   magic           0x3113
//! u16   version         100
//! i64   session start   seconds since epoch, 0 = idle
//! str   account id
//! str   referrer id
//! str   display name
//! i32   booking count
//! repeated per booking, in ledger order:
//!   u64 amount
//!   i64 date            Julian day number
//!   str description
//! ```
//! `str` is a `u32` byte length followed by UTF-8 bytes.
//!
//! The balance is never stored; it is always the sum of booking amounts.

pub mod codec;
pub mod error;
pub mod wire;

pub use codec::{ChainCodec, DecodedChain, FORMAT_VERSION, MAGIC, MIN_SUPPORTED_VERSION};
pub use error::{CodecError, CodecResult};
