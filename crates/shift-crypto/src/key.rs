use std::fmt;

/// Context strings for BLAKE3 key derivation. Changing either invalidates
/// every chain file written so far.
const CIPHER_CONTEXT: &str = "shift 2021-01-01 chain envelope cipher v1";
const TAG_CONTEXT: &str = "shift 2021-01-01 chain envelope integrity v1";

/// Pre-shared key material for the chain envelope.
///
/// Both the cipher key and the integrity key are derived from a single
/// 64-bit seed, so every installation with the same seed can read the same
/// chain file.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopeKey {
    cipher: [u8; 32],
    tag: [u8; 32],
}

impl EnvelopeKey {
    /// Seed used by existing chain files.
    pub const DEFAULT_SEED: u64 = 1313;

    /// Derive the envelope keys from a seed.
    pub fn from_seed(seed: u64) -> Self {
        let material = seed.to_le_bytes();
        Self {
            cipher: blake3::derive_key(CIPHER_CONTEXT, &material),
            tag: blake3::derive_key(TAG_CONTEXT, &material),
        }
    }

    pub(crate) fn cipher_key(&self) -> &[u8; 32] {
        &self.cipher
    }

    pub(crate) fn tag_key(&self) -> &[u8; 32] {
        &self.tag
    }

    /// Short public fingerprint (first 8 hex chars of the cipher key hash).
    pub fn fingerprint(&self) -> String {
        hex::encode(&blake3::hash(&self.cipher).as_bytes()[..4])
    }
}

impl Default for EnvelopeKey {
    fn default() -> Self {
        Self::from_seed(Self::DEFAULT_SEED)
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvelopeKey({})", self.fingerprint())
    }
}
