/// Keyed, domain-separated BLAKE3 hasher for integrity tags.
///
/// The domain tag is mixed into every computation so a tag produced for one
/// purpose can never verify data of another purpose, even under the same key.
pub struct IntegrityHasher<'k> {
    key: &'k [u8; 32],
    domain: &'static str,
}

impl<'k> IntegrityHasher<'k> {
    /// Domain used for the chain plaintext.
    pub const CHAIN_DOMAIN: &'static str = "shift-chain-v1";

    pub const fn new(key: &'k [u8; 32], domain: &'static str) -> Self {
        Self { key, domain }
    }

    /// Compute the 32-byte tag of `data`.
    pub fn tag(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_keyed(self.key);
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Constant-time comparison of `data` against an expected tag.
    pub fn verify(&self, data: &[u8], expected: &[u8; 32]) -> bool {
        blake3::Hash::from(self.tag(data)) == blake3::Hash::from(*expected)
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
