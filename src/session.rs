//! Session domain types — Session, BarberProfile, ConnectivityState, AuthState
//!
//! Serializable, cloneable, and cheap to pass around. `Session` is the only
//! type that crosses the persistence boundary; the rest live in memory only.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Authenticated credential bundle for one user.
///
/// A session is valid only while `expires_at` lies in the future. It is
/// replaced whole on every change, never edited field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer credential issued by the identity service
    pub access_token: String,
    /// Refresh material paired with the access token
    pub refresh_token: String,
    /// Owning user identifier
    pub user_id: String,
    /// Absolute expiry, seconds since the Unix epoch
    pub expires_at: i64,
}

impl Session {
    /// Check expiry against a supplied clock value (seconds since epoch)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Check expiry against the wall clock
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Provider ("barber") profile record.
///
/// Exists only while the current session's owner resolves as a provider;
/// discarded whenever the session is destroyed or resolves as a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarberProfile {
    pub barber_id: String,
    pub display_name: String,
    pub shop_name: Option<String>,
    /// Start of the working day, hour of day 0-23
    pub opens_at_hour: u8,
    /// End of the working day, hour of day 0-23
    pub closes_at_hour: u8,
}

/// A settled (debounced) reachability observation.
///
/// `seq` increases strictly with each settled observation so consumers can
/// drop stale, out-of-order updates: apply only when `seq` exceeds the last
/// applied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub reachable: bool,
    pub seq: u64,
}

impl ConnectivityState {
    /// Initial state before any observation has settled
    pub fn unknown() -> Self {
        Self {
            reachable: false,
            seq: 0,
        }
    }
}

/// The authoritative composite view of "who is logged in, with what role,
/// and are we online". Single writer: the auth orchestrator.
///
/// Invariants:
/// - `is_provider` implies `session.is_some()`
/// - `is_initialized` transitions false to true exactly once and never reverts
/// - `is_loading` is true only while a restore, sign-in, or sign-out is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub is_provider: bool,
    pub provider_profile: Option<BarberProfile>,
    pub is_online: bool,
    pub is_loading: bool,
    pub is_initialized: bool,
}

impl AuthState {
    /// State at process start, before restoration has run
    pub fn uninitialized() -> Self {
        Self {
            session: None,
            is_provider: false,
            provider_profile: None,
            is_online: false,
            is_loading: true,
            is_initialized: false,
        }
    }

    /// Convenience for consumers gating authenticated screens
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
