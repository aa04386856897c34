use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A single ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Booking {
    description: String,
    amount: u64,
    date: NaiveDate,
}

impl Booking {
    /// Description used for the seed booking of a new account.
    pub const INITIAL: &'static str = "Initial booking";

    /// Create a booking. The amount is whole tokens and must be positive.
    pub fn new(
        description: impl Into<String>,
        amount: u64,
        date: NaiveDate,
    ) -> Result<Self, TypeError> {
        if amount == 0 {
            return Err(TypeError::ZeroAmount);
        }
        Ok(Self {
            description: description.into(),
            amount,
            date,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_amount(&mut self, amount: u64) -> Result<(), TypeError> {
        if amount == 0 {
            return Err(TypeError::ZeroAmount);
        }
        self.amount = amount;
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }
}

/// Ordered collection of bookings.
///
/// New entries are conventionally inserted at index 0 so the ledger reads
/// newest first, but the ledger itself never reorders: whatever order it was
/// built or decoded in is the order it iterates in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLedger {
    entries: Vec<Booking>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<Booking>) -> Self {
        Self { entries }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Booking> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Booking> {
        self.entries.get_mut(index)
    }

    /// Insert at `index`, shifting later entries back by one.
    ///
    /// Valid positions are `0..=count()`. Any other index leaves the ledger
    /// untouched and returns `false`.
    pub fn insert(&mut self, index: usize, booking: Booking) -> bool {
        if index > self.entries.len() {
            return false;
        }
        self.entries.insert(index, booking);
        true
    }

    pub fn append(&mut self, booking: Booking) {
        self.entries.push(booking);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Booking> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Booking] {
        &self.entries
    }

    /// Sum of all amounts, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, b| acc.checked_add(b.amount))
    }
}

impl<'a> IntoIterator for &'a BookingLedger {
    type Item = &'a Booking;
    type IntoIter = std::slice::Iter<'a, Booking>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn booking(desc: &str, amount: u64) -> Booking {
        Booking::new(desc, amount, day(1)).unwrap()
    }

    #[test]
    fn zero_amount_rejected() {
        assert_eq!(Booking::new("x", 0, day(1)), Err(TypeError::ZeroAmount));
        let mut b = booking("x", 3);
        assert_eq!(b.set_amount(0), Err(TypeError::ZeroAmount));
        assert_eq!(b.amount(), 3);
    }

    #[test]
    fn setters_update_fields() {
        let mut b = booking("x", 3);
        b.set_description("y");
        b.set_amount(7).unwrap();
        b.set_date(day(9));
        assert_eq!(b.description(), "y");
        assert_eq!(b.amount(), 7);
        assert_eq!(b.date(), day(9));
    }

    #[test]
    fn insert_at_front_shifts_others() {
        let mut ledger = BookingLedger::new();
        ledger.append(booking("a", 1));
        ledger.append(booking("b", 2));
        assert!(ledger.insert(0, booking("new", 10)));
        assert_eq!(ledger.count(), 3);
        assert_eq!(ledger.get(0).unwrap().description(), "new");
        assert_eq!(ledger.get(1).unwrap().description(), "a");
        assert_eq!(ledger.get(2).unwrap().description(), "b");
    }

    #[test]
    fn insert_at_end_appends() {
        let mut ledger = BookingLedger::new();
        ledger.append(booking("a", 1));
        assert!(ledger.insert(1, booking("b", 2)));
        assert_eq!(ledger.get(1).unwrap().description(), "b");
    }

    #[test]
    fn insert_out_of_range_is_noop() {
        let mut ledger = BookingLedger::new();
        ledger.append(booking("a", 1));
        let before = ledger.clone();
        assert!(!ledger.insert(5, booking("z", 9)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn total_sums_amounts() {
        let ledger = BookingLedger::from_entries(vec![booking("a", 1), booking("b", 10)]);
        assert_eq!(ledger.total(), Some(11));
        assert_eq!(BookingLedger::new().total(), Some(0));
    }

    #[test]
    fn total_overflow_is_none() {
        let ledger = BookingLedger::from_entries(vec![booking("a", u64::MAX), booking("b", 1)]);
        assert_eq!(ledger.total(), None);
    }

    #[test]
    fn clear_empties() {
        let mut ledger = BookingLedger::from_entries(vec![booking("a", 1)]);
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.get(0).is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let ledger = BookingLedger::from_entries(vec![booking("a", 1), booking("b", 2)]);
        let json = serde_json::to_string(&ledger).unwrap();
        let parsed: BookingLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(ledger, parsed);
    }
}
