use shift_types::{AccountId, AccountIdentity, Booking, BookingLedger, SessionState};
use tracing::debug;

use crate::error::{CodecError, CodecResult};
use crate::wire::{WireReader, WireWriter};

/// Magic number at the start of every chain.
pub const MAGIC: u16 = 0x3113;
/// Version written by this codec.
pub const FORMAT_VERSION: u16 = 100;
/// Oldest version this codec accepts.
pub const MIN_SUPPORTED_VERSION: u16 = 100;

/// Everything a chain decodes to.
///
/// `identity.balance()` is always zero here; callers reconcile it against
/// `ledger` because the format carries no balance field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedChain {
    pub version: u16,
    pub session: SessionState,
    pub identity: AccountIdentity,
    pub ledger: BookingLedger,
}

/// Encoder/decoder for the chain layout.
pub struct ChainCodec;

impl ChainCodec {
    pub fn encode(
        identity: &AccountIdentity,
        ledger: &BookingLedger,
        session: SessionState,
    ) -> CodecResult<Vec<u8>> {
        let count = i32::try_from(ledger.count()).map_err(|_| CodecError::TooLarge {
            what: "booking count",
            len: ledger.count(),
        })?;

        let mut w = WireWriter::new();
        w.put_u16(MAGIC);
        w.put_u16(FORMAT_VERSION);
        w.put_i64(session.as_secs());
        w.put_str(identity.id().as_str())?;
        w.put_str(identity.referrer_id().as_str())?;
        w.put_str(identity.name())?;
        w.put_i32(count);
        for booking in ledger {
            w.put_u64(booking.amount());
            w.put_date(booking.date());
            w.put_str(booking.description())?;
        }

        debug!(bookings = count, bytes = w.position(), "encoded chain");
        Ok(w.finish())
    }

    pub fn decode(data: &[u8]) -> CodecResult<DecodedChain> {
        let mut r = WireReader::new(data);

        let magic = r.get_u16("magic")?;
        if magic != MAGIC {
            return Err(CodecError::bad(format!(
                "magic number is {magic:#06x}, expected {MAGIC:#06x}"
            )));
        }
        let version = r.get_u16("version")?;
        if version < MIN_SUPPORTED_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let session = SessionState::started_at(r.get_i64("session start")?);
        let id = AccountId::new(r.get_str("account id")?);
        let referrer = AccountId::new(r.get_str("referrer id")?);
        let name = r.get_str("display name")?;

        let count = r.get_i32("booking count")?;
        let count = usize::try_from(count)
            .map_err(|_| CodecError::bad(format!("negative booking count {count}")))?;

        // Each booking needs at least 20 bytes; don't trust `count` for the
        // allocation.
        let mut entries = Vec::with_capacity(count.min(r.remaining() / 20));
        for i in 0..count {
            let amount = r.get_u64("booking amount")?;
            let date = r.get_date("booking date")?;
            let description = r.get_str("booking description")?;
            let booking = Booking::new(description, amount, date)
                .map_err(|e| CodecError::bad(format!("booking {i}: {e}")))?;
            entries.push(booking);
        }

        if r.remaining() > 0 {
            debug!(trailing = r.remaining(), version, "ignoring trailing chain bytes");
        }

        Ok(DecodedChain {
            version,
            session,
            identity: AccountIdentity::new(id, referrer, name),
            ledger: BookingLedger::from_entries(entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> (AccountIdentity, BookingLedger, SessionState) {
        let identity = AccountIdentity::new(
            AccountId::from("{0b5e-uuid}"),
            AccountId::from("{referrer}"),
            "Olaf",
        );
        let ledger = BookingLedger::from_entries(vec![
            Booking::new("Liquid scooped", 10, day(2021, 2, 3)).unwrap(),
            Booking::new("Initial booking", 1, day(2021, 2, 1)).unwrap(),
        ]);
        (identity, ledger, SessionState::started_at(1_612_345_678))
    }

    #[test]
    fn roundtrip_preserves_everything() {
        let (identity, ledger, session) = sample();
        let bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        let decoded = ChainCodec::decode(&bytes).unwrap();
        assert_eq!(decoded.version, FORMAT_VERSION);
        assert_eq!(decoded.session, session);
        assert_eq!(decoded.identity, identity);
        assert_eq!(decoded.ledger, ledger);
    }

    #[test]
    fn header_layout() {
        let (identity, ledger, session) = sample();
        let bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        assert_eq!(&bytes[0..2], &[0x31, 0x13]);
        assert_eq!(&bytes[2..4], &100u16.to_be_bytes());
        assert_eq!(&bytes[4..12], &1_612_345_678i64.to_be_bytes());
    }

    #[test]
    fn decode_never_carries_balance() {
        let (mut identity, ledger, session) = sample();
        identity.credit(500).unwrap();
        let bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        assert_eq!(ChainCodec::decode(&bytes).unwrap().identity.balance(), 0);
    }

    #[test]
    fn empty_ledger_and_idle_session() {
        let identity = AccountIdentity::unregistered();
        let bytes =
            ChainCodec::encode(&identity, &BookingLedger::new(), SessionState::idle()).unwrap();
        let decoded = ChainCodec::decode(&bytes).unwrap();
        assert!(decoded.ledger.is_empty());
        assert!(!decoded.session.is_active());
        assert!(decoded.identity.id().is_unassigned());
    }

    #[test]
    fn wrong_magic_is_bad_format() {
        let (identity, ledger, session) = sample();
        let mut bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        bytes[0] = 0x13;
        assert!(matches!(
            ChainCodec::decode(&bytes),
            Err(CodecError::BadFileFormat(_))
        ));
    }

    #[test]
    fn old_version_is_unsupported() {
        let (identity, ledger, session) = sample();
        let mut bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        bytes[2..4].copy_from_slice(&99u16.to_be_bytes());
        assert_eq!(
            ChainCodec::decode(&bytes),
            Err(CodecError::UnsupportedVersion(99))
        );
        // Gating happens before any payload is read.
        assert_eq!(
            ChainCodec::decode(&[0x31, 0x13, 0x00, 0x01]),
            Err(CodecError::UnsupportedVersion(1))
        );
    }

    #[test]
    fn newer_version_is_accepted() {
        let (identity, ledger, session) = sample();
        let mut bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        bytes[2..4].copy_from_slice(&101u16.to_be_bytes());
        bytes.extend_from_slice(b"future fields");
        let decoded = ChainCodec::decode(&bytes).unwrap();
        assert_eq!(decoded.version, 101);
        assert_eq!(decoded.ledger, ledger);
    }

    #[test]
    fn every_truncation_is_bad_format() {
        let (identity, ledger, session) = sample();
        let bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    ChainCodec::decode(&bytes[..len]),
                    Err(CodecError::BadFileFormat(_))
                ),
                "truncation at {len} was accepted"
            );
        }
    }

    #[test]
    fn negative_count_is_bad_format() {
        let identity = AccountIdentity::unregistered();
        let mut bytes =
            ChainCodec::encode(&identity, &BookingLedger::new(), SessionState::idle()).unwrap();
        let at = bytes.len() - 4;
        bytes[at..].copy_from_slice(&(-3i32).to_be_bytes());
        assert!(matches!(
            ChainCodec::decode(&bytes),
            Err(CodecError::BadFileFormat(_))
        ));
    }

    #[test]
    fn zero_amount_booking_is_bad_format() {
        let (identity, ledger, session) = sample();
        let mut bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
        // First booking amount sits right after the count.
        let header = 2 + 2 + 8 + (4 + 11) + (4 + 10) + (4 + 4);
        let count_end = header + 4;
        bytes[count_end..count_end + 8].copy_from_slice(&0u64.to_be_bytes());
        assert!(matches!(
            ChainCodec::decode(&bytes),
            Err(CodecError::BadFileFormat(_))
        ));
    }

    fn arb_booking() -> impl Strategy<Value = Booking> {
        (".{0,24}", 1u64..=u64::MAX / 1024, 0i32..1_000_000).prop_map(|(desc, amount, days)| {
            let date = NaiveDate::from_num_days_from_ce_opt(days + 1).unwrap();
            Booking::new(desc, amount, date).unwrap()
        })
    }

    proptest! {
        #[test]
        fn roundtrip_law(
            id in "[a-f0-9-]{0,40}",
            referrer in "[a-f0-9-]{0,40}",
            name in ".{0,32}",
            session in any::<i64>(),
            bookings in proptest::collection::vec(arb_booking(), 0..16),
        ) {
            let identity = AccountIdentity::new(AccountId::new(id), AccountId::new(referrer), name);
            let ledger = BookingLedger::from_entries(bookings);
            let session = SessionState::started_at(session);

            let bytes = ChainCodec::encode(&identity, &ledger, session).unwrap();
            let decoded = ChainCodec::decode(&bytes).unwrap();

            prop_assert_eq!(decoded.identity, identity);
            prop_assert_eq!(decoded.session, session);
            prop_assert_eq!(decoded.ledger, ledger);
        }
    }
}
