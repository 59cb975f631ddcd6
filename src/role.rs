//! RoleResolver — provider-role lookup with offline short-circuit
//!
//! Role is an enrichment, not a blocking precondition for authentication:
//! whatever goes wrong, the caller gets a definite outcome and can finish
//! initializing. Offline resolution answers "customer" immediately with
//! zero remote calls; terminal failures fail open to the customer role.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::remote::{with_timeout, RoleService};
use crate::retry::RetryPolicy;
use crate::session::BarberProfile;

/// Outcome of a role resolution. Always definite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleOutcome {
    pub is_provider: bool,
    pub profile: Option<BarberProfile>,
}

impl RoleOutcome {
    fn customer() -> Self {
        Self::default()
    }

    fn provider(profile: BarberProfile) -> Self {
        Self {
            is_provider: true,
            profile: Some(profile),
        }
    }
}

/// Resolves whether an authenticated identity is a service provider
#[derive(Clone)]
pub struct RoleResolver {
    roles: Arc<dyn RoleService>,
    retry: RetryPolicy,
    remote_timeout: Duration,
}

impl RoleResolver {
    pub fn new(roles: Arc<dyn RoleService>, config: &SessionConfig) -> Self {
        Self {
            roles,
            retry: RetryPolicy::from_config(config),
            remote_timeout: config.remote_timeout,
        }
    }

    /// Resolve the role for `user_id`.
    ///
    /// Offline: customer outcome, zero remote calls — the caller must not
    /// block on a check that cannot possibly succeed. Online: provider
    /// lookup plus profile fetch under the retry policy; any terminal
    /// failure degrades to the customer outcome.
    pub async fn resolve(&self, user_id: &str, online: bool) -> RoleOutcome {
        if !online {
            debug!(user_id, "Offline; skipping role resolution");
            return RoleOutcome::customer();
        }

        let window = self.remote_timeout;
        let result = self
            .retry
            .run(|_| {
                let roles = Arc::clone(&self.roles);
                async move {
                    let is_provider = with_timeout(window, roles.is_provider(user_id)).await?;
                    if !is_provider {
                        return Ok(RoleOutcome::customer());
                    }
                    let profile =
                        with_timeout(window, roles.provider_profile(user_id)).await?;
                    Ok(RoleOutcome::provider(profile))
                }
            })
            .await;

        match result {
            Ok(outcome) => {
                debug!(user_id, is_provider = outcome.is_provider, "Role resolved");
                outcome
            }
            Err(e) => {
                warn!(user_id, error = %e, "Role resolution failed; defaulting to customer");
                RoleOutcome::customer()
            }
        }
    }
}
