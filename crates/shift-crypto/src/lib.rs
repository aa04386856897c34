//! Cipher envelope for the Shift ledger.
//!
//! Wraps arbitrary plaintext (the encoded chain) in a sealed envelope:
//! zstd compression, ChaCha20-Poly1305 encryption under a pre-shared key, and
//! a keyed BLAKE3 integrity tag over the plaintext that is verified before any
//! bytes are handed back.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod envelope;
pub mod error;
pub mod hasher;
pub mod key;

pub use envelope::{CipherEnvelope, ENVELOPE_VERSION};
pub use error::{CryptoError, CryptoResult};
pub use hasher::IntegrityHasher;
pub use key::EnvelopeKey;
