use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::hasher::IntegrityHasher;
use crate::key::EnvelopeKey;

/// Current envelope layout version.
pub const ENVELOPE_VERSION: u8 = 3;

const FLAG_COMPRESSED: u8 = 0x01;
const FLAG_TAGGED: u8 = 0x02;
const KNOWN_FLAGS: u8 = FLAG_COMPRESSED | FLAG_TAGGED;

const HEADER_LEN: usize = 2;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 32;
/// Poly1305 authentication tag appended by the AEAD.
const AEAD_OVERHEAD: usize = 16;
const ZSTD_LEVEL: i32 = 3;

/// Symmetric envelope around the encoded chain.
///
/// Sealed layout:
/// ```text
/// [1 byte: version] [1 byte: flags]       (bound as associated data)
/// [12 bytes: nonce]
/// [N bytes: ChaCha20-Poly1305( [32-byte integrity tag][payload] )]
/// ```
/// `payload` is the zstd-compressed plaintext when the compressed flag is set.
/// The integrity tag is always computed over the uncompressed plaintext.
#[derive(Clone, Debug)]
pub struct CipherEnvelope {
    key: EnvelopeKey,
    compress: bool,
}

impl CipherEnvelope {
    pub fn new(key: EnvelopeKey) -> Self {
        Self {
            key,
            compress: true,
        }
    }

    /// Disable compression for sealed output. Opening honours whatever the
    /// envelope header says.
    pub fn without_compression(mut self) -> Self {
        self.compress = false;
        self
    }

    pub fn key(&self) -> &EnvelopeKey {
        &self.key
    }

    /// Compress, tag, and encrypt `plain`.
    pub fn seal(&self, plain: &[u8]) -> CryptoResult<Vec<u8>> {
        let flags = if self.compress {
            FLAG_COMPRESSED | FLAG_TAGGED
        } else {
            FLAG_TAGGED
        };
        let header = [ENVELOPE_VERSION, flags];

        let tag = self.hasher().tag(plain);
        let mut body = Vec::with_capacity(TAG_LEN + plain.len());
        body.extend_from_slice(&tag);
        if self.compress {
            let compressed = zstd::encode_all(plain, ZSTD_LEVEL)
                .map_err(|e| CryptoError::Compression(e.to_string()))?;
            body.extend_from_slice(&compressed);
        } else {
            body.extend_from_slice(plain);
        }

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &body,
                    aad: &header,
                },
            )
            .map_err(|_| CryptoError::Encryption)?;

        let mut sealed = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&header);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        debug!(
            plain_len = plain.len(),
            sealed_len = sealed.len(),
            compressed = self.compress,
            "sealed envelope"
        );
        Ok(sealed)
    }

    /// Decrypt, decompress, and verify. Never returns unverified bytes.
    pub fn open(&self, sealed: &[u8]) -> CryptoResult<Vec<u8>> {
        if sealed.len() < HEADER_LEN + NONCE_LEN + AEAD_OVERHEAD + TAG_LEN {
            return Err(CryptoError::Truncated(sealed.len()));
        }
        let (header, rest) = sealed.split_at(HEADER_LEN);
        let version = header[0];
        if version != ENVELOPE_VERSION {
            return Err(CryptoError::UnsupportedVersion(version));
        }
        let flags = header[1];
        if flags & !KNOWN_FLAGS != 0 || flags & FLAG_TAGGED == 0 {
            return Err(CryptoError::UnknownFlags(flags));
        }

        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let body = self
            .cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| CryptoError::Decryption)?;

        if body.len() < TAG_LEN {
            return Err(CryptoError::Truncated(body.len()));
        }
        let (tag, payload) = body.split_at(TAG_LEN);
        let mut expected = [0u8; TAG_LEN];
        expected.copy_from_slice(tag);

        let plain = if flags & FLAG_COMPRESSED != 0 {
            zstd::decode_all(payload).map_err(|e| CryptoError::Decompression(e.to_string()))?
        } else {
            payload.to_vec()
        };

        if !self.hasher().verify(&plain, &expected) {
            return Err(CryptoError::IntegrityMismatch);
        }

        debug!(plain_len = plain.len(), "opened envelope");
        Ok(plain)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(self.key.cipher_key().into())
    }

    fn hasher(&self) -> IntegrityHasher<'_> {
        IntegrityHasher::new(self.key.tag_key(), IntegrityHasher::CHAIN_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> CipherEnvelope {
        CipherEnvelope::new(EnvelopeKey::default())
    }

    #[test]
    fn seal_open_roundtrip() {
        let env = envelope();
        let sealed = env.seal(b"chain bytes").unwrap();
        assert_eq!(env.open(&sealed).unwrap(), b"chain bytes");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let env = envelope();
        let sealed = env.seal(b"").unwrap();
        assert!(env.open(&sealed).unwrap().is_empty());
    }

    #[test]
    fn uncompressed_roundtrip() {
        let env = envelope().without_compression();
        let sealed = env.seal(b"plain").unwrap();
        assert_eq!(sealed[1], FLAG_TAGGED);
        // A compressing envelope with the same key still opens it.
        assert_eq!(envelope().open(&sealed).unwrap(), b"plain");
    }

    #[test]
    fn nonces_differ_between_seals() {
        let env = envelope();
        let a = env.seal(b"same").unwrap();
        let b = env.seal(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn compressible_data_shrinks() {
        let data = vec![0x31u8; 50_000];
        let sealed = envelope().seal(&data).unwrap();
        assert!(sealed.len() < data.len());
    }

    #[test]
    fn every_flipped_byte_is_rejected() {
        let env = envelope();
        let sealed = env.seal(b"magic 0x3113 version 100").unwrap();
        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            assert!(env.open(&tampered).is_err(), "byte {i} flip went unnoticed");
        }
    }

    #[test]
    fn wrong_key_is_rejected() {
        let sealed = envelope().seal(b"secret").unwrap();
        let other = CipherEnvelope::new(EnvelopeKey::from_seed(42));
        assert_eq!(other.open(&sealed), Err(CryptoError::Decryption));
    }

    #[test]
    fn truncated_is_rejected() {
        let env = envelope();
        assert_eq!(env.open(&[ENVELOPE_VERSION]), Err(CryptoError::Truncated(1)));
        let sealed = env.seal(b"x").unwrap();
        assert!(env.open(&sealed[..sealed.len() - 1]).is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let env = envelope();
        let mut sealed = env.seal(b"x").unwrap();
        sealed[0] = 9;
        assert_eq!(env.open(&sealed), Err(CryptoError::UnsupportedVersion(9)));
    }

    #[test]
    fn tag_mismatch_under_valid_aead_is_rejected() {
        // Build an envelope whose AEAD is valid but whose inner tag is wrong.
        let key = EnvelopeKey::default();
        let header = [ENVELOPE_VERSION, FLAG_TAGGED];
        let mut body = vec![0u8; TAG_LEN];
        body.extend_from_slice(b"payload");
        let nonce = [7u8; NONCE_LEN];
        let ciphertext = ChaCha20Poly1305::new(key.cipher_key().into())
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &body,
                    aad: &header,
                },
            )
            .unwrap();
        let mut sealed = header.to_vec();
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        assert_eq!(
            CipherEnvelope::new(key).open(&sealed),
            Err(CryptoError::IntegrityMismatch)
        );
    }
}
