//! Auth service client and session verification.
//!
//! The auth service owns credentials and token issuance; this crate
//! verifies the tokens it mints (JWKS + RS256) and proxies the password
//! sign-in/sign-up endpoints used by the auth-entry pages.

pub mod client;
pub mod error;
pub mod evidence;
pub mod verifier;

pub use client::{AuthClient, AuthClientConfig, TokenResponse};
pub use error::{AuthError, AuthResult};
pub use evidence::{extract_token, DEFAULT_SESSION_COOKIE};
pub use verifier::{JwtVerifier, VerifierConfig};
