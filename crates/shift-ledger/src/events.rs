use std::fmt;

use shift_types::SessionState;
use tokio::sync::broadcast;
use tracing::trace;

use crate::errlog::ErrorKind;

/// Change notification raised by the chain and the sync client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    /// Whole-token balance changed.
    BalanceChanged { balance: u64 },
    /// A session started or was closed.
    SessionChanged { session: SessionState },
    /// Id, referrer, or display name changed.
    IdentityChanged,
    /// Bookings were added, edited, or cleared.
    BookingsChanged { count: usize },
    /// The welcome message was replaced.
    MessageChanged,
    /// The peer list was rebuilt.
    PeersChanged { count: usize },
    /// A new entry was appended to the error log.
    ErrorLogged { kind: ErrorKind },
}

impl fmt::Display for ChainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BalanceChanged { balance } => write!(f, "balance_changed({balance})"),
            Self::SessionChanged { session } => write!(f, "session_changed({})", session.as_secs()),
            Self::IdentityChanged => f.write_str("identity_changed"),
            Self::BookingsChanged { count } => write!(f, "bookings_changed({count})"),
            Self::MessageChanged => f.write_str("message_changed"),
            Self::PeersChanged { count } => write!(f, "peers_changed({count})"),
            Self::ErrorLogged { kind } => write!(f, "error_logged({kind})"),
        }
    }
}

/// A broadcast channel receiver for chain events.
pub type EventStream = broadcast::Receiver<ChainEvent>;

/// Fan-out of chain events to any number of subscribers.
///
/// Emitting never blocks and never fails; with no subscribers the event is
/// dropped, and a subscriber that falls more than `capacity` events behind
/// sees `RecvError::Lagged`.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ChainEvent>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: ChainEvent) {
        trace!(%event, "chain event");
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn every_subscriber_sees_every_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(ChainEvent::IdentityChanged);
        bus.emit(ChainEvent::BalanceChanged { balance: 7 });

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.try_recv().unwrap(), ChainEvent::IdentityChanged);
            assert_eq!(rx.try_recv().unwrap(), ChainEvent::BalanceChanged { balance: 7 });
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        }
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit(ChainEvent::MessageChanged);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn slow_subscriber_lags() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for count in 0..5 {
            bus.emit(ChainEvent::PeersChanged { count });
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(_))));
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(
            ChainEvent::ErrorLogged { kind: ErrorKind::Network }.to_string(),
            "error_logged(network)"
        );
    }
}
