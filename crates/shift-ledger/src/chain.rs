use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use shift_store::ChainStore;
use shift_types::{AccountIdentity, Booking, BookingLedger, Referrer, SessionState, TypeError};
use tracing::{debug, info, warn};

use crate::errlog::{ErrorKind, ErrorLog, LoggedError};
use crate::error::{ChainError, ChainResult};
use crate::events::{ChainEvent, EventBus, EventStream};
use crate::minting::{Accrual, MintingPolicy};

/// Amount of the seed booking every new account starts with.
pub const INITIAL_BOOKING_AMOUNT: u64 = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ChainState {
    identity: AccountIdentity,
    ledger: BookingLedger,
    session: SessionState,
}

/// The persisted account: identity, bookings, and scooping session.
///
/// Every mutating operation builds the next state on the side, writes it to
/// the store, and only then swaps it in. A failed write therefore leaves the
/// chain exactly as it was. After any successful load or mutation the
/// identity's balance equals the sum of the ledger's amounts.
///
/// Not reentrant: drive it from one logical thread.
pub struct Chain {
    store: Arc<dyn ChainStore>,
    policy: MintingPolicy,
    state: ChainState,
    errors: ErrorLog,
    events: EventBus,
}

impl Chain {
    /// An unregistered, empty chain backed by `store`. Nothing is read.
    pub fn new(store: Arc<dyn ChainStore>, policy: MintingPolicy) -> Self {
        Self {
            store,
            policy,
            state: ChainState::default(),
            errors: ErrorLog::new(),
            events: EventBus::default(),
        }
    }

    /// Load the chain from `store`, or start empty if nothing was saved yet.
    pub fn open(store: Arc<dyn ChainStore>, policy: MintingPolicy) -> ChainResult<Self> {
        let mut chain = Self::new(store, policy);
        if chain.store.exists()? {
            chain.load()?;
        } else {
            debug!(location = %chain.store.location(), "no chain yet, starting empty");
        }
        Ok(chain)
    }

    /// Replace the in-memory state with what the store holds.
    pub fn load(&mut self) -> ChainResult<()> {
        let decoded = match self.store.load() {
            Ok(decoded) => decoded,
            Err(e) => return Err(self.fail(e.into())),
        };

        let mut identity = decoded.identity;
        if let Err(e) = identity.reconcile(&decoded.ledger) {
            return Err(self.fail(e.into()));
        }

        info!(
            location = %self.store.location(),
            version = decoded.version,
            account = %identity.id().short_id(),
            bookings = decoded.ledger.count(),
            balance = identity.balance(),
            "chain loaded"
        );
        self.replace(ChainState {
            identity,
            ledger: decoded.ledger,
            session: decoded.session,
        });
        Ok(())
    }

    /// Write the current state to the store.
    pub fn save(&mut self) -> ChainResult<()> {
        let state = &self.state;
        match self.store.save(&state.identity, &state.ledger, state.session) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    // ---------------------------------------------------------------
    // Account lifecycle
    // ---------------------------------------------------------------

    /// Start a fresh account in memory: new id, zero balance, no bookings,
    /// no session. Nothing is persisted until [`Chain::seed_account`].
    pub fn begin_account(&mut self, name: &str, referrer: &Referrer) -> &AccountIdentity {
        let identity = AccountIdentity::generate(name, referrer);
        info!(
            account = %identity.id().short_id(),
            self_referred = identity.is_self_referred(),
            "account created locally"
        );
        self.replace(ChainState {
            identity,
            ..ChainState::default()
        });
        &self.state.identity
    }

    /// Give a registered account its initial booking and persist it.
    pub fn seed_account(&mut self, today: NaiveDate) -> ChainResult<()> {
        let mut next = self.state.clone();
        next.ledger
            .insert(0, Booking::new(Booking::INITIAL, INITIAL_BOOKING_AMOUNT, today)?);
        next.identity.reconcile(&next.ledger)?;
        self.commit(next)
    }

    pub fn rename(&mut self, name: &str) -> ChainResult<()> {
        if self.state.identity.name() == name {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.identity.set_name(name);
        self.commit(next)
    }

    // ---------------------------------------------------------------
    // Minting
    // ---------------------------------------------------------------

    /// Start a scooping session at `now`.
    ///
    /// A session that already ran past its window is settled first. A session
    /// still inside its window is rejected with [`ChainError::SessionActive`].
    pub fn start_session(&mut self, now: DateTime<Utc>) -> ChainResult<SessionState> {
        match self.minted_balance(now) {
            Accrual::Expired { elapsed_secs } => self.settle(now, elapsed_secs)?,
            Accrual::Accruing { .. } => {
                return Err(ChainError::SessionActive {
                    since: self.state.session.as_secs(),
                })
            }
            Accrual::Idle { .. } => {}
        }

        let session = SessionState::started_at(now.timestamp());
        let mut next = self.state.clone();
        next.session = session;
        self.commit(next)?;
        info!(since = session.as_secs(), "scooping session started");
        Ok(session)
    }

    /// Displayed balance at `now`, in thousandths of a token.
    ///
    /// When the running session is past its window this closes it: the
    /// reward booking is inserted at the front of the ledger, the balance is
    /// credited, the session goes idle, and the result is persisted before
    /// the settled value is returned.
    pub fn current_balance(&mut self, now: DateTime<Utc>) -> ChainResult<u64> {
        match self.minted_balance(now) {
            Accrual::Idle { milli } | Accrual::Accruing { milli, .. } => Ok(milli),
            Accrual::Expired { elapsed_secs } => {
                self.settle(now, elapsed_secs)?;
                Ok(self.policy.settled(self.state.identity.balance()))
            }
        }
    }

    /// What [`Chain::current_balance`] would see at `now`, without side effects.
    pub fn minted_balance(&self, now: DateTime<Utc>) -> Accrual {
        self.policy
            .assess(self.state.identity.balance(), self.state.session, now.timestamp())
    }

    fn settle(&mut self, now: DateTime<Utc>, elapsed_secs: i64) -> ChainResult<()> {
        let today = now.with_timezone(&Local).date_naive();
        let reward = Booking::new(
            self.policy.reward_description.as_str(),
            self.policy.reward,
            today,
        )?;

        let mut next = self.state.clone();
        next.ledger.insert(0, reward);
        next.identity.credit(self.policy.reward)?;
        next.session = SessionState::idle();
        self.commit(next)?;

        info!(
            elapsed_secs,
            reward = self.policy.reward,
            balance = self.state.identity.balance(),
            "scooping session settled"
        );
        Ok(())
    }

    // ---------------------------------------------------------------
    // Bookings
    // ---------------------------------------------------------------

    /// Edit one booking in place and persist. The balance follows the edit.
    pub fn amend_booking<F>(&mut self, index: usize, edit: F) -> ChainResult<()>
    where
        F: FnOnce(&mut Booking) -> Result<(), TypeError>,
    {
        let len = self.state.ledger.count();
        let mut next = self.state.clone();
        let booking = next
            .ledger
            .get_mut(index)
            .ok_or(ChainError::NoSuchBooking { index, len })?;
        edit(booking)?;
        next.identity.reconcile(&next.ledger)?;
        self.commit(next)
    }

    /// Drop every booking and persist. The balance becomes zero.
    pub fn clear_bookings(&mut self) -> ChainResult<()> {
        let mut next = self.state.clone();
        next.ledger.clear();
        next.identity.reconcile(&next.ledger)?;
        self.commit(next)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn identity(&self) -> &AccountIdentity {
        &self.state.identity
    }

    pub fn ledger(&self) -> &BookingLedger {
        &self.state.ledger
    }

    pub fn session(&self) -> SessionState {
        self.state.session
    }

    /// Whole-token balance.
    pub fn balance(&self) -> u64 {
        self.state.identity.balance()
    }

    pub fn policy(&self) -> &MintingPolicy {
        &self.policy
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    // ---------------------------------------------------------------
    // Errors and events
    // ---------------------------------------------------------------

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Append to the error log and announce it.
    pub fn log_error(&mut self, kind: ErrorKind, message: impl Into<String>) -> &LoggedError {
        let message = message.into();
        warn!(%kind, %message, "error logged");
        self.events.emit(ChainEvent::ErrorLogged { kind });
        self.errors.push(kind, message)
    }

    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn commit(&mut self, next: ChainState) -> ChainResult<()> {
        if let Err(e) = self.store.save(&next.identity, &next.ledger, next.session) {
            return Err(self.fail(e.into()));
        }
        self.replace(next);
        Ok(())
    }

    fn replace(&mut self, next: ChainState) {
        let prev = std::mem::replace(&mut self.state, next);
        let cur = &self.state;

        if prev.identity.id() != cur.identity.id()
            || prev.identity.referrer_id() != cur.identity.referrer_id()
            || prev.identity.name() != cur.identity.name()
        {
            self.events.emit(ChainEvent::IdentityChanged);
        }
        if prev.ledger != cur.ledger {
            self.events.emit(ChainEvent::BookingsChanged {
                count: cur.ledger.count(),
            });
        }
        if prev.identity.balance() != cur.identity.balance() {
            self.events.emit(ChainEvent::BalanceChanged {
                balance: cur.identity.balance(),
            });
        }
        if prev.session != cur.session {
            self.events.emit(ChainEvent::SessionChanged {
                session: cur.session,
            });
        }
    }

    fn fail(&mut self, err: ChainError) -> ChainError {
        if let Some(kind) = err.log_kind() {
            self.log_error(kind, err.to_string());
        }
        err
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("location", &self.store.location())
            .field("account", &self.state.identity.id())
            .field("balance", &self.state.identity.balance())
            .field("bookings", &self.state.ledger.count())
            .field("session", &self.state.session)
            .finish()
    }
}
