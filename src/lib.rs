//! # Fadebook Session
//!
//! Session and connectivity lifecycle core for the Fadebook barbershop
//! booking client: establishing, caching, restoring, and tearing down an
//! authenticated identity, deriving the customer/provider role, and keeping
//! all of it consistent under unreliable connectivity and overlapping
//! asynchronous work.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              fadebook-session                 │
//! ├───────────────────────┬───────────────────────┤
//! │    AuthOrchestrator   │  ConnectivityObserver │
//! │  (restore, sign-in/   │  (debounce, de-dup,   │
//! │   out, convergence)   │   offline notices)    │
//! ├──────────┬────────────┴──┬────────────────────┤
//! │ RoleRes- │  RetryPolicy  │   CredentialVault  │
//! │ olver    │  (transient   │   + FirstRunGuard  │
//! │          │   backoff)    │                    │
//! ├──────────┴───────────────┴────────────────────┤
//! │  IdentityService / RoleService / SecretStore  │
//! │        (injected collaborator traits)         │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fadebook_session::auth::AuthOrchestrator;
//! use fadebook_session::config::SessionConfig;
//! use fadebook_session::connectivity::ConnectivityObserver;
//! use fadebook_session::store::{FileMarkerStore, FileSecretStore};
//! use fadebook_session::vault::CredentialVault;
//! # use fadebook_session::remote::{IdentityService, RoleService};
//!
//! # async fn wire(identity: Arc<dyn IdentityService>, roles: Arc<dyn RoleService>) {
//! let config = SessionConfig::new();
//! let vault = CredentialVault::new(
//!     Arc::new(FileSecretStore::new("/data/fadebook/secure")),
//!     &config.session_key,
//! );
//! let marker = Arc::new(FileMarkerStore::new("/data/fadebook"));
//!
//! let (raw_tx, raw_rx) = tokio::sync::mpsc::channel(16);
//! let (settled_tx, settled_rx) = tokio::sync::mpsc::channel(16);
//! let feed = ConnectivityObserver::spawn(raw_rx, &config, settled_tx);
//!
//! let auth = AuthOrchestrator::spawn(vault, marker, identity, roles, settled_rx, config).await;
//!
//! let state = auth.wait_until_initialized().await;
//! println!("signed in: {}", state.is_authenticated());
//! # let _ = (raw_tx, feed);
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - An expired session is never surfaced and is evicted from the vault
//! - `sign_out` clears local state and the vault even when the remote fails
//! - Transient network failures are retried with bounded linear backoff;
//!   credential rejections are surfaced once, never retried
//! - Stale async results (old epoch, old connectivity sequence) are dropped,
//!   never applied

pub mod auth;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod remote;
pub mod retry;
pub mod role;
pub mod session;
pub mod store;
pub mod vault;

// Re-exports for convenience
pub use auth::{AuthHandle, AuthOrchestrator};
pub use config::SessionConfig;
pub use connectivity::{ConnectivityFeed, ConnectivityNotice, ConnectivityObserver};
pub use error::{Result, SessionError};
pub use remote::{IdentityService, RoleService};
pub use retry::RetryPolicy;
pub use role::{RoleOutcome, RoleResolver};
pub use session::{AuthState, BarberProfile, ConnectivityState, Session};
pub use store::{MarkerStore, SecretStore};
pub use vault::CredentialVault;
