//! AuthOrchestrator — Tokio actor owning the authoritative auth state
//!
//! All state mutation happens inside one actor loop fed by an mpsc mailbox,
//! so restoration, sign-in/out, remote session-change notifications, and
//! settled connectivity observations are serialized no matter how they
//! interleave in real time. State is republished through a watch channel;
//! consumers read a snapshot or subscribe.
//!
//! Two guards keep out-of-order async results from corrupting state:
//! - an epoch counter bumped on every session replacement or clear; spawned
//!   role resolutions carry the epoch they started under and are dropped on
//!   mismatch
//! - a connectivity sequence number; observations older than the last
//!   applied one are dropped
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fadebook_session::auth::AuthOrchestrator;
//! use fadebook_session::config::SessionConfig;
//! use fadebook_session::connectivity::ConnectivityObserver;
//! use fadebook_session::store::{MemoryMarkerStore, MemorySecretStore};
//! use fadebook_session::vault::CredentialVault;
//! # use fadebook_session::remote::{IdentityService, RoleService};
//! # async fn wire(identity: Arc<dyn IdentityService>, roles: Arc<dyn RoleService>) {
//! let config = SessionConfig::new();
//! let vault = CredentialVault::new(Arc::new(MemorySecretStore::new()), &config.session_key);
//! let marker = Arc::new(MemoryMarkerStore::new());
//!
//! let (raw_tx, raw_rx) = tokio::sync::mpsc::channel(16);
//! let (settled_tx, settled_rx) = tokio::sync::mpsc::channel(16);
//! let feed = ConnectivityObserver::spawn(raw_rx, &config, settled_tx);
//!
//! let handle = AuthOrchestrator::spawn(vault, marker, identity, roles, settled_rx, config).await;
//!
//! // Platform reachability callbacks push into raw_tx; the UI reads state:
//! let state = handle.wait_until_initialized().await;
//! if state.is_authenticated() { /* show home screen */ }
//! # let _ = (raw_tx, feed);
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::remote::{with_timeout, IdentityService, RoleService};
use crate::retry::RetryPolicy;
use crate::role::{RoleOutcome, RoleResolver};
use crate::session::{AuthState, ConnectivityState, Session};
use crate::store::MarkerStore;
use crate::vault::{first_run_purge, CredentialVault};

// ─── Actor Messages ───

enum AuthMsg {
    SignIn {
        email: String,
        password: String,
        reply: oneshot::Sender<Result<Session>>,
    },
    SignOut {
        reply: oneshot::Sender<Result<()>>,
    },
    Restore,
    SessionChanged(Option<Session>),
    Connectivity(ConnectivityState),
    RoleResolved {
        epoch: u64,
        outcome: RoleOutcome,
    },
}

// ─── Actor ───

/// Session lifecycle actor — single writer of [`AuthState`]
pub struct AuthOrchestrator {
    vault: CredentialVault,
    identity: Arc<dyn IdentityService>,
    resolver: RoleResolver,
    config: SessionConfig,
    state: AuthState,
    state_tx: watch::Sender<AuthState>,
    self_tx: mpsc::WeakSender<AuthMsg>,
    rx: mpsc::Receiver<AuthMsg>,
    /// Bumped on every session replacement or clear; stale async results
    /// tagged with an older epoch are discarded
    epoch: u64,
    last_conn_seq: u64,
}

impl AuthOrchestrator {
    /// Run the first-run purge, subscribe to remote session changes, enqueue
    /// the startup restoration, and start the actor loop.
    ///
    /// The actor stops when every [`AuthHandle`] clone has been dropped; any
    /// in-flight result completing after that goes nowhere.
    pub async fn spawn(
        vault: CredentialVault,
        marker: Arc<dyn MarkerStore>,
        identity: Arc<dyn IdentityService>,
        roles: Arc<dyn RoleService>,
        connectivity_rx: mpsc::Receiver<ConnectivityState>,
        config: SessionConfig,
    ) -> AuthHandle {
        // Must complete before any restoration logic runs
        first_run_purge(marker.as_ref(), &config.first_run_key, &vault).await;

        let (tx, rx) = mpsc::channel(config.mailbox_capacity);
        let (state_tx, state_rx) = watch::channel(AuthState::uninitialized());

        // Remote session-change forwarder: the single source of truth for
        // local/remote convergence, alive for the life of the process
        let mut events = identity.session_events();
        let weak = tx.downgrade();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(session) => {
                        let Some(tx) = weak.upgrade() else { break };
                        if tx.send(AuthMsg::SessionChanged(session)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Session event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // Settled connectivity forwarder
        let weak = tx.downgrade();
        let mut connectivity_rx = connectivity_rx;
        tokio::spawn(async move {
            while let Some(observation) = connectivity_rx.recv().await {
                let Some(tx) = weak.upgrade() else { break };
                if tx.send(AuthMsg::Connectivity(observation)).await.is_err() {
                    break;
                }
            }
        });

        let actor = Self {
            vault,
            identity,
            resolver: RoleResolver::new(roles, &config),
            config,
            state: AuthState::uninitialized(),
            state_tx,
            self_tx: tx.downgrade(),
            rx,
            epoch: 0,
            last_conn_seq: 0,
        };

        // Startup restoration is the first message the loop processes
        let _ = tx.send(AuthMsg::Restore).await;

        tokio::spawn(actor.run());
        info!("AuthOrchestrator spawned");

        AuthHandle {
            tx,
            state: state_rx,
        }
    }

    /// Main event loop
    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                AuthMsg::SignIn {
                    email,
                    password,
                    reply,
                } => {
                    let _ = reply.send(self.handle_sign_in(&email, &password).await);
                }
                AuthMsg::SignOut { reply } => {
                    let _ = reply.send(self.handle_sign_out().await);
                }
                AuthMsg::Restore => self.handle_restore(true).await,
                AuthMsg::SessionChanged(next) => self.handle_session_changed(next).await,
                AuthMsg::Connectivity(observation) => {
                    self.handle_connectivity(observation).await
                }
                AuthMsg::RoleResolved { epoch, outcome } => {
                    self.handle_role_resolved(epoch, outcome)
                }
            }
        }
        info!("AuthOrchestrator stopped");
    }

    // ─── Handler Implementations ───

    /// Cache-first restoration. `consult_cache` is false when re-entered
    /// from a connectivity online transition, where the cache was already
    /// consulted at startup.
    async fn handle_restore(&mut self, consult_cache: bool) {
        self.set_loading(true);

        if consult_cache {
            if let Some(cached) = self.vault.get().await {
                if !cached.is_expired() {
                    debug!(user_id = %cached.user_id, "Adopting cached session");
                    self.adopt(cached.clone());
                    let outcome = self
                        .resolver
                        .resolve(&cached.user_id, self.state.is_online)
                        .await;
                    self.apply_role(outcome);
                    self.finish_restore();
                    return;
                }
                info!("Cached session expired; evicting");
                self.vault.clear().await;
            }
        }

        if self.state.is_online {
            match with_timeout(self.config.remote_timeout, self.identity.current_session()).await
            {
                Ok(Some(session)) => {
                    info!(user_id = %session.user_id, "Live session fetch succeeded");
                    self.adopt(session.clone());
                    let outcome = self.resolver.resolve(&session.user_id, true).await;
                    self.apply_role(outcome);
                }
                Ok(None) => debug!("No active remote session"),
                Err(e) => {
                    warn!(error = %e, "Live session fetch failed; staying unauthenticated")
                }
            }
        }

        self.finish_restore();
    }

    async fn handle_sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        // Fail fast: retrying a doomed exchange wastes the attempt budget
        // and delays user feedback
        if !self.state.is_online {
            return Err(SessionError::Offline);
        }

        self.set_loading(true);

        let retry = RetryPolicy::from_config(&self.config);
        let identity = Arc::clone(&self.identity);
        let window = self.config.remote_timeout;
        let result = retry
            .run(|_| {
                let identity = Arc::clone(&identity);
                async move {
                    with_timeout(window, identity.sign_in_with_password(email, password))
                        .await
                        .map_err(reclassify)
                }
            })
            .await;

        match result {
            Ok(session) => {
                info!(user_id = %session.user_id, "Sign-in succeeded");
                // Fast-path local adoption; persistence happens when the
                // remote session-change event echoes this session back
                self.adopt(session.clone());
                let outcome = self
                    .resolver
                    .resolve(&session.user_id, self.state.is_online)
                    .await;
                self.apply_role(outcome);
                self.set_loading(false);
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.set_loading(false);
                Err(e)
            }
        }
    }

    /// Terminal local teardown: a stuck logged-in state is worse than an
    /// orphaned remote session, so local state and the vault are cleared no
    /// matter what the remote call does. No retry on the remote sign-out.
    async fn handle_sign_out(&mut self) -> Result<()> {
        self.set_loading(true);

        if let Err(e) = with_timeout(self.config.remote_timeout, self.identity.sign_out()).await {
            warn!(error = %e, "Remote sign-out failed; clearing local state anyway");
        }

        self.clear_session();
        self.vault.clear().await;
        self.set_loading(false);
        info!("Signed out");
        Ok(())
    }

    /// Remote session-change notification: the remote side is the final
    /// authority, and this is the single persistence funnel for the vault.
    async fn handle_session_changed(&mut self, next: Option<Session>) {
        match next {
            Some(session) if session.is_expired() => {
                // An expired session is never surfaced or cached
                warn!(user_id = %session.user_id, "Remote pushed an expired session; treating as signed out");
                self.vault.clear().await;
                if self.state.session.is_some() {
                    self.clear_session();
                }
            }
            Some(session) => {
                self.vault.put(&session).await;
                if self.state.session.as_ref() != Some(&session) {
                    debug!(user_id = %session.user_id, "Adopting pushed session");
                    let user_id = session.user_id.clone();
                    self.adopt(session);
                    self.spawn_role_resolution(user_id);
                }
            }
            None => {
                self.vault.clear().await;
                if self.state.session.is_some() {
                    info!("Remote session ended");
                    self.clear_session();
                }
            }
        }
    }

    async fn handle_connectivity(&mut self, observation: ConnectivityState) {
        if observation.seq <= self.last_conn_seq {
            debug!(
                seq = observation.seq,
                applied = self.last_conn_seq,
                "Stale connectivity observation dropped"
            );
            return;
        }
        self.last_conn_seq = observation.seq;

        if self.state.is_online != observation.reachable {
            self.state.is_online = observation.reachable;
            self.publish();
        }

        // Online with no session: retry the live fetch; the cache was
        // already consulted at startup
        if observation.reachable && self.state.session.is_none() {
            self.handle_restore(false).await;
        }
    }

    fn handle_role_resolved(&mut self, epoch: u64, outcome: RoleOutcome) {
        if epoch != self.epoch {
            debug!(
                epoch,
                current = self.epoch,
                "Stale role resolution dropped"
            );
            return;
        }
        self.apply_role(outcome);
    }

    // ─── Helpers ───

    /// Replace the current session wholesale. Role and profile reset until
    /// a resolution for the new epoch lands.
    fn adopt(&mut self, session: Session) {
        self.epoch += 1;
        self.state.session = Some(session);
        self.state.is_provider = false;
        self.state.provider_profile = None;
        self.publish();
    }

    fn clear_session(&mut self) {
        self.epoch += 1;
        self.state.session = None;
        self.state.is_provider = false;
        self.state.provider_profile = None;
        self.publish();
    }

    fn apply_role(&mut self, outcome: RoleOutcome) {
        // is_provider implies session
        if self.state.session.is_some() {
            self.state.is_provider = outcome.is_provider;
            self.state.provider_profile = outcome.profile;
        } else {
            self.state.is_provider = false;
            self.state.provider_profile = None;
        }
        self.publish();
    }

    fn spawn_role_resolution(&self, user_id: String) {
        let resolver = self.resolver.clone();
        let online = self.state.is_online;
        let epoch = self.epoch;
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            let outcome = resolver.resolve(&user_id, online).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(AuthMsg::RoleResolved { epoch, outcome }).await;
            }
        });
    }

    fn finish_restore(&mut self) {
        self.state.is_loading = false;
        // Latches true exactly once, never reverts
        self.state.is_initialized = true;
        self.publish();
    }

    fn set_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

/// Apply the string-classification shim once, at the sign-in boundary, for
/// backends that surface bare message strings
fn reclassify(e: SessionError) -> SessionError {
    match e {
        SessionError::Service(msg) => SessionError::classify_remote(&msg),
        other => other,
    }
}

// ─── Handle (client-facing API) ───

/// Cloneable handle to the auth orchestrator
#[derive(Clone)]
pub struct AuthHandle {
    tx: mpsc::Sender<AuthMsg>,
    state: watch::Receiver<AuthState>,
}

impl AuthHandle {
    /// Exchange credentials for a session.
    ///
    /// Rejects immediately with [`SessionError::Offline`] when the device is
    /// offline. Transient network failures are retried internally; the final
    /// error is classified once and carries a single human-readable cause.
    pub async fn sign_in(&self, email: impl Into<String>, password: impl Into<String>) -> Result<Session> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AuthMsg::SignIn {
                email: email.into(),
                password: password.into(),
                reply,
            })
            .await
            .map_err(|_| SessionError::Orchestrator("mailbox closed".into()))?;
        rx.await
            .map_err(|_| SessionError::Orchestrator("reply dropped".into()))?
    }

    /// End the session locally and remotely. Local state and the vault are
    /// cleared even when the remote call fails.
    pub async fn sign_out(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(AuthMsg::SignOut { reply })
            .await
            .map_err(|_| SessionError::Orchestrator("mailbox closed".into()))?;
        rx.await
            .map_err(|_| SessionError::Orchestrator("reply dropped".into()))?
    }

    /// Snapshot of the current auth state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to auth state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Wait until startup restoration has completed, then return the state
    pub async fn wait_until_initialized(&self) -> AuthState {
        let mut rx = self.state.clone();
        loop {
            {
                let state = rx.borrow();
                if state.is_initialized {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }
}
