use std::fmt;

use serde::{Deserialize, Serialize};

use crate::booking::BookingLedger;
use crate::error::TypeError;

/// Opaque account identifier.
///
/// Locally generated ids are UUID v7 strings, but ids read from storage or
/// received from the remote service are kept verbatim. The empty id marks an
/// account that has not been created yet.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Generate a fresh, time-ordered account id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id that marks an account which was never created.
    pub fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Who referred a new account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Referrer {
    /// No referrer: the account refers to itself.
    Myself,
    /// Referred by another existing account.
    Account(AccountId),
}

impl Referrer {
    /// Sentinel accepted from callers to request a self-referral.
    pub const SELF_SENTINEL: &'static str = "me";

    /// Parse user input. `"me"` and blank input mean self-referral.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == Self::SELF_SENTINEL {
            Self::Myself
        } else {
            Self::Account(AccountId::new(trimmed))
        }
    }

    /// Resolve to a concrete id given the account's own id.
    pub fn resolve(&self, own: &AccountId) -> AccountId {
        match self {
            Self::Myself => own.clone(),
            Self::Account(id) => id.clone(),
        }
    }
}

/// Identity and balance of the local account.
///
/// `balance` is whole tokens and must always equal the sum of the booking
/// amounts in the ledger that accompanies this identity. The owning aggregate
/// maintains that through [`AccountIdentity::credit`] and
/// [`AccountIdentity::reconcile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    id: AccountId,
    referrer_id: AccountId,
    name: String,
    balance: u64,
}

impl AccountIdentity {
    /// Build an identity from stored fields. The balance starts at zero.
    pub fn new(id: AccountId, referrer_id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            referrer_id,
            name: name.into(),
            balance: 0,
        }
    }

    /// Create a brand new identity with a freshly generated id.
    pub fn generate(name: impl Into<String>, referrer: &Referrer) -> Self {
        let id = AccountId::generate();
        let referrer_id = referrer.resolve(&id);
        Self::new(id, referrer_id, name)
    }

    /// An identity that has not been created yet.
    pub fn unregistered() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn referrer_id(&self) -> &AccountId {
        &self.referrer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Returns `true` once the account has both an id and a display name.
    pub fn is_registered(&self) -> bool {
        !self.id.is_unassigned() && !self.name.is_empty()
    }

    /// Returns `true` when the account refers to itself.
    pub fn is_self_referred(&self) -> bool {
        self.id == self.referrer_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Add whole tokens to the balance.
    pub fn credit(&mut self, amount: u64) -> Result<(), TypeError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TypeError::BalanceOverflow)?;
        Ok(())
    }

    /// Recompute the balance from a ledger.
    pub fn reconcile(&mut self, ledger: &BookingLedger) -> Result<(), TypeError> {
        self.balance = ledger.total().ok_or(TypeError::BalanceOverflow)?;
        Ok(())
    }
}
