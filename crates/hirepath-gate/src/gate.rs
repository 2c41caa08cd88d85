//! Async gate orchestrator.
//!
//! Wires the pure decision function to the two external collaborators:
//! session resolution and role lookup. Each call is bounded by an
//! explicit timeout; expiry counts as a lookup failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use hirepath_models::{AccountId, Role, Session};

use crate::decision::{decide, Decision};
use crate::policy::RoutePolicy;

/// Default timeout for each external lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves request evidence into a session.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Verify a token and return its session.
    async fn resolve(&self, token: &str) -> anyhow::Result<Session>;
}

/// Looks up the authorization role for a subject.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    /// Return the role, or `None` when no account row exists.
    async fn role(&self, subject: &AccountId) -> anyhow::Result<Option<Role>>;
}

/// The access gate.
///
/// Stateless per invocation; safe to share across concurrent requests.
#[derive(Clone)]
pub struct Gate {
    policy: Arc<RoutePolicy>,
    sessions: Arc<dyn SessionResolver>,
    roles: Arc<dyn RoleLookup>,
    lookup_timeout: Duration,
}

impl Gate {
    pub fn new(
        policy: RoutePolicy,
        sessions: Arc<dyn SessionResolver>,
        roles: Arc<dyn RoleLookup>,
    ) -> Self {
        Self {
            policy: Arc::new(policy),
            sessions,
            roles,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Evaluate one request.
    ///
    /// `path` is the request path; `query` its raw query string, if any;
    /// `token` the extracted session evidence. Never errors: every
    /// failure degrades to the safe branch of the decision table.
    pub async fn evaluate(&self, path: &str, query: Option<&str>, token: Option<&str>) -> Decision {
        let class = self.policy.classify(path);

        // Outside the intercepted set: not evaluated at all.
        let Some(class) = class else {
            return Decision::Allow;
        };

        let original = match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        };

        if !class.needs_role() {
            return decide(&self.policy, Some(class), None, None, &original);
        }

        let session = match token {
            Some(token) => self.resolve_session(token).await,
            None => None,
        };

        let role = match &session {
            Some(session) => self.lookup_role(&session.subject).await,
            None => None,
        };

        let decision = decide(&self.policy, Some(class), session.as_ref(), role, &original);
        debug!(
            path,
            class = class.as_str(),
            decision = decision.as_str(),
            "gate decision"
        );
        decision
    }

    /// Resolve the session, failing open to "no session".
    async fn resolve_session(&self, token: &str) -> Option<Session> {
        match tokio::time::timeout(self.lookup_timeout, self.sessions.resolve(token)).await {
            Ok(Ok(session)) => Some(session),
            Ok(Err(e)) => {
                debug!("Session resolution failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Session resolution timed out");
                None
            }
        }
    }

    /// Look up the role, failing closed to "not admin".
    async fn lookup_role(&self, subject: &AccountId) -> Option<Role> {
        match tokio::time::timeout(self.lookup_timeout, self.roles.role(subject)).await {
            Ok(Ok(role)) => role,
            Ok(Err(e)) => {
                warn!(subject = %subject, "Role lookup failed: {}", e);
                None
            }
            Err(_) => {
                warn!(subject = %subject, "Role lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    struct FixedResolver(Option<Session>);

    #[async_trait]
    impl SessionResolver for FixedResolver {
        async fn resolve(&self, _token: &str) -> anyhow::Result<Session> {
            self.0
                .clone()
                .ok_or_else(|| anyhow::anyhow!("bad signature"))
        }
    }

    struct FixedRoles(anyhow::Result<Option<Role>>);

    #[async_trait]
    impl RoleLookup for FixedRoles {
        async fn role(&self, _subject: &AccountId) -> anyhow::Result<Option<Role>> {
            match &self.0 {
                Ok(role) => Ok(*role),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    struct SlowRoles;

    #[async_trait]
    impl RoleLookup for SlowRoles {
        async fn role(&self, _subject: &AccountId) -> anyhow::Result<Option<Role>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some(Role::Admin))
        }
    }

    fn session() -> Session {
        Session {
            subject: AccountId::from("u-1"),
            email: None,
            issued_at: Utc::now(),
            expires_at: Utc::now() + ChronoDuration::hours(1),
        }
    }

    fn gate(resolver: FixedResolver, roles: impl RoleLookup + 'static) -> Gate {
        Gate::new(RoutePolicy::default(), Arc::new(resolver), Arc::new(roles))
    }

    #[tokio::test]
    async fn non_intercepted_path_allows_without_lookups() {
        // A resolver that would error is never consulted.
        let gate = gate(
            FixedResolver(None),
            FixedRoles(Err(anyhow::anyhow!("store down"))),
        );
        assert!(gate.evaluate("/jobs/42", None, Some("token")).await.is_allow());
    }

    #[tokio::test]
    async fn missing_token_redirects_with_return_target() {
        let gate = gate(FixedResolver(None), FixedRoles(Ok(None)));
        let decision = gate.evaluate("/admin/dashboard", None, None).await;
        assert_eq!(
            decision,
            Decision::redirect("/auth/login?redirectedFrom=%2Fadmin%2Fdashboard")
        );
    }

    #[tokio::test]
    async fn unverifiable_token_counts_as_no_session() {
        let gate = gate(FixedResolver(None), FixedRoles(Ok(Some(Role::Admin))));
        let decision = gate.evaluate("/dashboard", None, Some("garbage")).await;
        assert_eq!(
            decision,
            Decision::redirect("/auth/login?redirectedFrom=%2Fdashboard")
        );
    }

    #[tokio::test]
    async fn admin_session_on_candidate_path_redirects_to_admin_home() {
        let gate = gate(
            FixedResolver(Some(session())),
            FixedRoles(Ok(Some(Role::Admin))),
        );
        let decision = gate.evaluate("/dashboard", None, Some("token")).await;
        assert_eq!(decision, Decision::redirect("/admin"));
    }

    #[tokio::test]
    async fn role_lookup_error_redirects_away_from_admin_path() {
        let gate = gate(
            FixedResolver(Some(session())),
            FixedRoles(Err(anyhow::anyhow!("store down"))),
        );
        let decision = gate.evaluate("/admin", None, Some("token")).await;
        assert_eq!(decision, Decision::redirect("/dashboard"));
    }

    #[tokio::test]
    async fn role_lookup_timeout_is_a_lookup_failure() {
        let gate = gate(FixedResolver(Some(session())), SlowRoles)
            .with_lookup_timeout(Duration::from_millis(20));
        let decision = gate.evaluate("/admin", None, Some("token")).await;
        assert_eq!(decision, Decision::redirect("/dashboard"));
    }

    #[tokio::test]
    async fn query_string_rides_along_in_return_target() {
        let gate = gate(FixedResolver(None), FixedRoles(Ok(None)));
        let decision = gate
            .evaluate("/applications", Some("page=2"), None)
            .await;
        assert_eq!(
            decision,
            Decision::redirect("/auth/login?redirectedFrom=%2Fapplications%3Fpage%3D2")
        );
    }
}
