//! CredentialVault — best-effort encrypted cache of the one session record
//!
//! The vault is a cache, not the source of truth: read failures, write
//! failures, and corrupt records are logged and reported as "no session"
//! rather than propagated. An expired or undecodable record is evicted on
//! read so it can never be adopted by a later restore.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::session::Session;
use crate::store::{MarkerStore, SecretStore};

/// Encrypted persistence for exactly one session record
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn SecretStore>,
    key: String,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn SecretStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the cached session, if any.
    ///
    /// Returns `None` for a missing record, a record that fails to decode
    /// (evicted), or a storage fault (logged).
    pub async fn get(&self) -> Option<Session> {
        let bytes = match self.store.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Vault read failed; treating as no session");
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Corrupt session record; evicting");
                self.clear().await;
                None
            }
        }
    }

    /// Persist the full serialized session. Failures are logged, not raised.
    pub async fn put(&self, session: &Session) {
        let bytes = match serde_json::to_vec(session) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Session serialization failed; not cached");
                return;
            }
        };
        if let Err(e) = self.store.put(&self.key, bytes).await {
            warn!(error = %e, "Vault write failed; session not cached");
        }
    }

    /// Erase the cached session. Succeeds silently when no record exists;
    /// other failures are logged, not raised.
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(&self.key).await {
            warn!(error = %e, "Vault clear failed");
        }
    }
}

/// First-run guard: purge any stale cached session left over from a
/// previous install generation.
///
/// The encrypted store can outlive the unencrypted marker store across a
/// reinstall. If the marker is absent this clears the vault unconditionally,
/// then sets the marker. Idempotent, and safe to race with other startup
/// work since it only ever clears the session record.
pub async fn first_run_purge(
    marker: &dyn MarkerStore,
    marker_key: &str,
    vault: &CredentialVault,
) {
    let has_run = match marker.get_flag(marker_key).await {
        Ok(flag) => flag,
        Err(e) => {
            warn!(error = %e, "First-run marker read failed; skipping purge");
            return;
        }
    };

    if has_run {
        return;
    }

    debug!("First run detected; purging any stale cached session");
    vault.clear().await;
    if let Err(e) = marker.set_flag(marker_key).await {
        warn!(error = %e, "Failed to set first-run marker");
    }
}
