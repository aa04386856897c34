use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use shift_ledger::{Chain, ChainEvent};
use shift_types::{AccountId, Peer, Referrer};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::{SyncError, SyncResult};
use crate::http::HttpRemote;
use crate::transport::RemoteService;

/// Welcome message shown until the service provides one.
pub const DEFAULT_MESSAGE: &str = "WELCOME BACK";

/// Cancels the remote calls a [`SyncClient`] has in flight.
///
/// Only calls already running when [`CancelHandle::cancel`] is invoked are
/// aborted; later calls proceed normally.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    generation: Arc<watch::Sender<u64>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            generation: Arc::new(tx),
        }
    }

    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a [`Chain`] through the remote protocol.
///
/// Local state is always committed first. The remote outcome is reported
/// afterwards and, on failure, appended to the chain's error log.
pub struct SyncClient {
    chain: Chain,
    remote: Arc<dyn RemoteService>,
    timeout: Duration,
    cancel: CancelHandle,
    message: String,
    peers: Vec<Peer>,
}

impl SyncClient {
    pub fn new(chain: Chain, remote: Arc<dyn RemoteService>, timeout: Duration) -> Self {
        Self {
            chain,
            remote,
            timeout,
            cancel: CancelHandle::new(),
            message: DEFAULT_MESSAGE.to_string(),
            peers: Vec::new(),
        }
    }

    /// Client talking to the service described by `config` over HTTP.
    pub fn connect(chain: Chain, config: RemoteConfig) -> SyncResult<Self> {
        let timeout = config.timeout();
        let remote = HttpRemote::new(config)?;
        Ok(Self::new(chain, Arc::new(remote), timeout))
    }

    /// Create a new account and register it with the service.
    ///
    /// The account is only seeded and persisted once the service accepted it.
    /// If registration fails the chain keeps the fresh, unpersisted identity
    /// with a zero balance and no bookings, and the caller may retry.
    pub async fn create_account(
        &mut self,
        name: &str,
        referrer: &Referrer,
    ) -> SyncResult<AccountId> {
        let identity = self.chain.begin_account(name, referrer).clone();

        let outcome = self.guarded(self.remote.register(&identity)).await;
        if let Err(e) = outcome {
            return Err(self.record("register", e));
        }

        self.chain.seed_account(Local::now().date_naive())?;
        self.message = DEFAULT_MESSAGE.to_string();
        self.chain.events().emit(ChainEvent::IdentityChanged);
        self.chain.events().emit(ChainEvent::MessageChanged);
        info!(account = %identity.id().short_id(), "account registered");
        Ok(identity.id().clone())
    }

    /// Start a session locally, then tell the service.
    ///
    /// Returns `Ok(true)` when the service acknowledged and `Ok(false)` when
    /// the notification failed or was skipped. The local session stands
    /// either way.
    pub async fn start_session(&mut self, now: DateTime<Utc>) -> SyncResult<bool> {
        let session = self.chain.start_session(now)?;
        let id = self.chain.identity().id().clone();
        if id.is_unassigned() {
            debug!("session started before account creation, not notifying");
            return Ok(false);
        }

        let outcome = self.guarded(self.remote.set_scooping(&id, session)).await;
        match outcome {
            Ok(()) => Ok(true),
            Err(e) => {
                self.record("setscooping", e);
                Ok(false)
            }
        }
    }

    /// Refresh the welcome message. A no-op returning `Ok(false)` until the
    /// account has an id and a name.
    pub async fn fetch_message(&mut self) -> SyncResult<bool> {
        if !self.chain.identity().is_registered() {
            return Ok(false);
        }
        let name = self.chain.identity().name().to_string();
        let outcome = self.guarded(self.remote.message(&name)).await;
        match outcome {
            Ok(message) => {
                self.set_message(message);
                Ok(true)
            }
            Err(e) => Err(self.record("message", e)),
        }
    }

    /// Rebuild the peer list. A no-op returning `Ok(false)` until the account
    /// has an id and a name.
    pub async fn fetch_peers(&mut self) -> SyncResult<bool> {
        if !self.chain.identity().is_registered() {
            return Ok(false);
        }
        let id = self.chain.identity().id().clone();
        let outcome = self.guarded(self.remote.mates(&id)).await;
        match outcome {
            Ok(peers) => {
                debug!(count = peers.len(), "peer list refreshed");
                self.peers = peers;
                self.chain.events().emit(ChainEvent::PeersChanged {
                    count: self.peers.len(),
                });
                Ok(true)
            }
            Err(e) => Err(self.record("matelist", e)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Peers currently in a session, judged with the chain's session window.
    pub fn active_peers(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Peer> {
        let window = self.chain.policy().window_secs;
        let now = now.timestamp();
        self.peers
            .iter()
            .filter(move |p| p.scooping.is_scooping(now, window))
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    pub fn into_chain(self) -> Chain {
        self.chain
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    async fn guarded<T, F>(&self, call: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        let mut cancelled = self.cancel.subscribe();
        tokio::select! {
            res = tokio::time::timeout(self.timeout, call) => {
                res.unwrap_or(Err(SyncError::Timeout(self.timeout)))
            }
            Ok(()) = cancelled.changed() => Err(SyncError::Cancelled),
        }
    }

    fn set_message(&mut self, message: String) {
        if message != self.message {
            self.message = message;
            self.chain.events().emit(ChainEvent::MessageChanged);
        }
    }

    fn record(&mut self, op: &str, err: SyncError) -> SyncError {
        warn!(op, error = %err, "remote call failed");
        if let Some(kind) = err.log_kind() {
            self.chain.log_error(kind, err.to_string());
        }
        err
    }
}
