//! Remote collaborator contracts — identity and role services
//!
//! The backend owns the credential exchange and the provider tables; this
//! crate only depends on these trait shapes. Every outbound call the core
//! makes is wrapped in [`with_timeout`]; a call that exceeds the window is
//! abandoned and classified as a transient network failure.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{Result, SessionError};
use crate::session::{BarberProfile, Session};

/// Remote identity service: credential exchange and session authority
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;

    /// Live fetch of the session the remote currently considers active
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Push feed of session changes. `None` means signed out or deactivated.
    /// The remote side is the final authority on session state; the
    /// orchestrator converges on whatever arrives here.
    fn session_events(&self) -> broadcast::Receiver<Option<Session>>;
}

/// Remote role service: provider lookup and profile fetch
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn is_provider(&self, user_id: &str) -> Result<bool>;

    async fn provider_profile(&self, user_id: &str) -> Result<BarberProfile>;
}

/// Bound an outbound remote call; a timeout becomes a transient error
pub async fn with_timeout<T, F>(window: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(window, fut).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout),
    }
}
