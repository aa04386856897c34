use shift_codec::{ChainCodec, DecodedChain};
use shift_crypto::{CipherEnvelope, EnvelopeKey};
use shift_types::{AccountIdentity, BookingLedger, SessionState};

use crate::error::StoreResult;

/// Codec plus envelope: the full transformation between chain state and the
/// bytes that hit storage.
#[derive(Clone, Debug)]
pub struct ChainSealer {
    envelope: CipherEnvelope,
}

impl ChainSealer {
    pub fn new(key: EnvelopeKey) -> Self {
        Self {
            envelope: CipherEnvelope::new(key),
        }
    }

    pub fn with_envelope(envelope: CipherEnvelope) -> Self {
        Self { envelope }
    }

    pub fn seal(
        &self,
        identity: &AccountIdentity,
        ledger: &BookingLedger,
        session: SessionState,
    ) -> StoreResult<Vec<u8>> {
        let plain = ChainCodec::encode(identity, ledger, session)?;
        Ok(self.envelope.seal(&plain)?)
    }

    /// Verification happens in full before decoding starts.
    pub fn open(&self, sealed: &[u8]) -> StoreResult<DecodedChain> {
        let plain = self.envelope.open(sealed)?;
        Ok(ChainCodec::decode(&plain)?)
    }
}

impl Default for ChainSealer {
    fn default() -> Self {
        Self::new(EnvelopeKey::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chrono::NaiveDate;
    use shift_codec::CodecError;
    use shift_crypto::CryptoError;
    use proptest::prelude::*;
    use shift_types::{AccountId, Booking};

    fn state() -> (AccountIdentity, BookingLedger, SessionState) {
        let identity =
            AccountIdentity::new(AccountId::from("me-1"), AccountId::from("me-1"), "Ann");
        let date = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        let ledger = BookingLedger::from_entries(vec![
            Booking::new("Liquid scooped", 10, date).unwrap(),
            Booking::new(Booking::INITIAL, 1, date).unwrap(),
        ]);
        (identity, ledger, SessionState::started_at(1_620_000_000))
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealer = ChainSealer::default();
        let (identity, ledger, session) = state();
        let bytes = sealer.seal(&identity, &ledger, session).unwrap();
        let decoded = sealer.open(&bytes).unwrap();
        assert_eq!(decoded.identity, identity);
        assert_eq!(decoded.ledger, ledger);
        assert_eq!(decoded.session, session);
    }

    #[test]
    fn tampered_bytes_are_crypto_errors() {
        let sealer = ChainSealer::default();
        let (identity, ledger, session) = state();
        let bytes = sealer.seal(&identity, &ledger, session).unwrap();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] = tampered[i].wrapping_add(1);
            assert!(
                matches!(sealer.open(&tampered), Err(StoreError::Crypto(_))),
                "flip at {i} was not a crypto error"
            );
        }
    }

    #[test]
    fn valid_envelope_with_bad_magic_is_format_error() {
        let envelope = CipherEnvelope::new(EnvelopeKey::default());
        let sealed = envelope.seal(&[0xDE, 0xAD, 0x00, 0x64]).unwrap();
        let err = ChainSealer::with_envelope(envelope).open(&sealed).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Format(CodecError::BadFileFormat(_))
        ));
    }

    #[test]
    fn wrong_key_is_crypto_error() {
        let (identity, ledger, session) = state();
        let bytes = ChainSealer::default().seal(&identity, &ledger, session).unwrap();
        let err = ChainSealer::new(EnvelopeKey::from_seed(2)).open(&bytes).unwrap_err();
        assert!(matches!(err, StoreError::Crypto(CryptoError::Decryption)));
    }

    fn arb_booking() -> impl Strategy<Value = Booking> {
        (".{0,24}", 1u64..=u64::MAX / 1024, 0i32..1_000_000).prop_map(|(desc, amount, days)| {
            let date = NaiveDate::from_num_days_from_ce_opt(days + 1).unwrap();
            Booking::new(desc, amount, date).unwrap()
        })
    }

    proptest! {
        #[test]
        fn sealed_chain_reopens_unchanged(
            id in "[a-f0-9-]{0,40}",
            referrer in "[a-f0-9-]{0,40}",
            name in ".{0,32}",
            session in any::<i64>(),
            bookings in proptest::collection::vec(arb_booking(), 0..16),
            seed in any::<u64>(),
        ) {
            let sealer = ChainSealer::new(EnvelopeKey::from_seed(seed));
            let identity = AccountIdentity::new(AccountId::new(id), AccountId::new(referrer), name);
            let ledger = BookingLedger::from_entries(bookings);
            let session = SessionState::started_at(session);

            let bytes = sealer.seal(&identity, &ledger, session).unwrap();
            let decoded = sealer.open(&bytes).unwrap();

            prop_assert_eq!(decoded.identity, identity);
            prop_assert_eq!(decoded.session, session);
            prop_assert_eq!(decoded.ledger, ledger);
        }
    }
}
