//! The pure gate decision function.

use hirepath_models::{Role, Session};

use crate::policy::{RouteClass, RoutePolicy, REDIRECTED_FROM_PARAM, SIGN_IN_PATH};

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request unchanged.
    Allow,
    /// Short-circuit with a redirect to `location`.
    Redirect { location: String },
}

impl Decision {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Redirect { .. } => "redirect",
        }
    }
}

/// Build the sign-in redirect, preserving the original path (and query)
/// for post-login return.
pub fn sign_in_redirect(original: &str) -> Decision {
    Decision::redirect(format!(
        "{}?{}={}",
        SIGN_IN_PATH,
        REDIRECTED_FROM_PARAM,
        urlencoding::encode(original)
    ))
}

/// Decide what happens to a request.
///
/// * `class` — route classification; `None` means the path is outside the
///   intercepted set and is never evaluated.
/// * `session` — resolved session, if any; an expired session counts as
///   absent.
/// * `role` — account role, when one was looked up; `None` after a lookup
///   failure degrades to "not admin".
/// * `original` — the originally requested path-and-query, used for the
///   sign-in return target.
pub fn decide(
    policy: &RoutePolicy,
    class: Option<RouteClass>,
    session: Option<&Session>,
    role: Option<Role>,
    original: &str,
) -> Decision {
    let Some(class) = class else {
        return Decision::Allow;
    };

    let session = session.filter(|s| !s.is_expired());
    let is_admin = role.map(|r| r.is_admin()).unwrap_or(false);

    match (class, session) {
        (RouteClass::Public, _) => Decision::Allow,

        // Anonymous callers may see the login/signup pages.
        (RouteClass::AuthEntry, None) => Decision::Allow,
        // Signed-in callers get bounced to their home instead.
        (RouteClass::AuthEntry, Some(_)) => Decision::redirect(policy.home_for(role)),

        // Authenticated tiers without a session go to sign-in.
        (RouteClass::Candidate | RouteClass::Admin, None) => sign_in_redirect(original),

        (RouteClass::Candidate, Some(_)) => {
            if is_admin {
                Decision::redirect(Role::Admin.home_path())
            } else {
                Decision::Allow
            }
        }

        (RouteClass::Admin, Some(_)) => {
            if is_admin {
                Decision::Allow
            } else {
                Decision::redirect(Role::Candidate.home_path())
            }
        }
    }
}
