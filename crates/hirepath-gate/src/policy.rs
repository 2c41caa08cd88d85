//! Static route classification policy.
//!
//! One table maps path prefixes to required tiers; everything the policy
//! knows about redirect targets hangs off `Role::home_path`, keeping the
//! whole policy auditable without touching transport code.

use hirepath_models::Role;

/// Path of the sign-in page.
pub const SIGN_IN_PATH: &str = "/auth/login";

/// Query parameter carrying the originally requested path.
pub const REDIRECTED_FROM_PARAM: &str = "redirectedFrom";

/// Authorization tier required by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Inside the intercepted set but open to everyone.
    Public,
    /// Login/signup pages: only sensible for anonymous callers.
    AuthEntry,
    /// Requires a session with the candidate role.
    Candidate,
    /// Requires a session with the admin role.
    Admin,
}

impl RouteClass {
    /// Whether this class ever needs the account role resolved.
    pub fn needs_role(&self) -> bool {
        !matches!(self, RouteClass::Public)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Public => "public",
            RouteClass::AuthEntry => "auth_entry",
            RouteClass::Candidate => "candidate",
            RouteClass::Admin => "admin",
        }
    }
}

/// Static table of intercepted prefixes.
///
/// Paths matching no prefix bypass the gate entirely; ties between
/// overlapping prefixes resolve to the most specific (longest) one.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<(String, RouteClass)>,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(vec![
            ("/admin".to_string(), RouteClass::Admin),
            ("/dashboard".to_string(), RouteClass::Candidate),
            ("/profile".to_string(), RouteClass::Candidate),
            ("/applications".to_string(), RouteClass::Candidate),
            ("/auth".to_string(), RouteClass::Public),
            ("/auth/login".to_string(), RouteClass::AuthEntry),
            ("/auth/signup".to_string(), RouteClass::AuthEntry),
        ])
    }
}

impl RoutePolicy {
    /// Build a policy from explicit rules.
    pub fn new(rules: Vec<(String, RouteClass)>) -> Self {
        Self { rules }
    }

    /// Classify a request path.
    ///
    /// Returns `None` when the path is outside the intercepted set.
    pub fn classify(&self, path: &str) -> Option<RouteClass> {
        self.rules
            .iter()
            .filter(|(prefix, _)| prefix_matches(prefix, path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, class)| *class)
    }

    /// Home path for a role; unknown roles land on the candidate home.
    pub fn home_for(&self, role: Option<Role>) -> &'static str {
        role.unwrap_or(Role::Candidate).home_path()
    }
}

/// Prefix match on whole path segments: `/admin` matches `/admin` and
/// `/admin/jobs` but not `/administrator`.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
