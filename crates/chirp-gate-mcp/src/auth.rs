// chirp-gate-mcp/src/auth.rs
// ============================================================================
// Module: Credential Extraction and Request Context
// Description: Per-request credential handling for Chirp Gate tool calls.
// Purpose: Parse caller credentials once per request and scope them to it.
// Dependencies: chirp-gate-core, chirp-gate-config
// ============================================================================

//! ## Overview
//! This module owns the request-scoped credential layer. The transport
//! boundary calls [`extract_credentials`] exactly once per inbound request;
//! the result is bound into an immutable [`RequestAuthContext`] that is
//! threaded by value through that request's processing and dropped on every
//! exit path. Because each in-flight request owns its own context, two
//! concurrent requests can never observe each other's credentials; there is
//! no process-wide slot to overwrite. Extraction validates shape only, never
//! liveness; a stale pair surfaces later as an upstream `Forbidden` which the
//! router maps back to [`AuthError::Unauthenticated`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;

use chirp_gate_core::CredentialPair;
use thiserror::Error;

use crate::config::MissingCredentialPolicy;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Distinguished marker telling the caller to supply or refresh credentials.
pub const AUTH_REQUIRED_MARKER: &str = "AUTH_REQUIRED";

/// Maximum accepted Authorization header size.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Credential Extraction
// ============================================================================

/// Extracts a credential pair from an inbound request's Authorization header.
///
/// Paths on the exempt allow-list short-circuit to `Ok(None)` without
/// inspecting the header. An absent header follows the configured
/// [`MissingCredentialPolicy`]. A present header must have the shape
/// `Bearer <auth_token>:<csrf_token>`; both tokens must be non-empty.
///
/// Pure and synchronous: shape validation only, no upstream calls.
///
/// # Errors
///
/// Returns [`AuthError`] when the header is required but absent, malformed,
/// or carries an invalid token payload.
pub fn extract_credentials(
    raw_header: Option<&str>,
    request_path: &str,
    policy: MissingCredentialPolicy,
    exempt_paths: &[String],
) -> Result<Option<CredentialPair>, AuthError> {
    if exempt_paths.iter().any(|path| path == request_path) {
        return Ok(None);
    }
    let Some(header) = raw_header else {
        return match policy {
            MissingCredentialPolicy::Anonymous => Ok(None),
            MissingCredentialPolicy::Reject => Err(AuthError::Missing),
        };
    };
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Malformed);
    }
    let mut parts = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::Malformed);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Malformed);
    }
    let Some((auth_token, csrf_token)) = token.split_once(':') else {
        return Err(AuthError::InvalidToken);
    };
    let pair =
        CredentialPair::new(auth_token, csrf_token).map_err(|_| AuthError::InvalidToken)?;
    Ok(Some(pair))
}

// ============================================================================
// SECTION: Request Auth Context
// ============================================================================

/// Immutable association between one in-flight request and its credentials.
///
/// # Invariants
/// - Constructed once per request at the transport boundary.
/// - Threaded by value; never stored in process-wide state.
/// - Dropped on every exit path of the owning request.
#[derive(Debug, Clone)]
pub struct RequestAuthContext {
    /// Transport used by the caller.
    transport: ServerTransport,
    /// Peer IP address when available.
    peer_ip: Option<IpAddr>,
    /// Credentials bound for this request, when any.
    credentials: Option<CredentialPair>,
    /// Request identifier for audit labeling.
    request_id: Option<String>,
}

impl RequestAuthContext {
    /// Builds a stdio request context. Stdio requests carry no header and
    /// always run anonymously.
    #[must_use]
    pub const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            peer_ip: None,
            credentials: None,
            request_id: None,
        }
    }

    /// Builds an HTTP/SSE request context from the extraction result.
    #[must_use]
    pub const fn http(
        transport: ServerTransport,
        peer_ip: Option<IpAddr>,
        credentials: Option<CredentialPair>,
    ) -> Self {
        Self {
            transport,
            peer_ip,
            credentials,
            request_id: None,
        }
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the credentials bound for this request, when any.
    #[must_use]
    pub const fn credentials(&self) -> Option<&CredentialPair> {
        self.credentials.as_ref()
    }

    /// Returns the transport used by the caller.
    #[must_use]
    pub const fn transport(&self) -> ServerTransport {
        self.transport
    }

    /// Returns the peer IP address when available.
    #[must_use]
    pub const fn peer_ip(&self) -> Option<IpAddr> {
        self.peer_ip
    }

    /// Returns the request identifier for audit labeling.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the bound credential fingerprint for audit labeling.
    #[must_use]
    pub fn credential_fingerprint(&self) -> Option<String> {
        self.credentials.as_ref().map(CredentialPair::fingerprint)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Authentication failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header on a request that requires one.
    #[error("missing authorization header")]
    Missing,
    /// Authorization header does not match the bearer shape.
    #[error("invalid authorization header format")]
    Malformed,
    /// Bearer token payload is not a valid credential pair.
    #[error("invalid or expired token")]
    InvalidToken,
    /// A tool call ran without bound credentials, or the platform rejected
    /// them; the caller must re-authenticate.
    #[error("authentication required: AUTH_REQUIRED")]
    Unauthenticated,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions."
    )]

    use chirp_gate_core::CredentialPair;

    use super::AuthError;
    use super::MissingCredentialPolicy;
    use super::extract_credentials;

    /// Default exempt paths used by extraction tests.
    fn exempt() -> Vec<String> {
        vec!["/health".to_string(), "/docs".to_string()]
    }

    #[test]
    fn exempt_path_short_circuits_without_header_inspection() {
        let result = extract_credentials(
            Some("garbage"),
            "/health",
            MissingCredentialPolicy::Reject,
            &exempt(),
        );
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn missing_header_passes_through_under_anonymous_policy() {
        let result =
            extract_credentials(None, "/mcp", MissingCredentialPolicy::Anonymous, &exempt());
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn missing_header_fails_under_reject_policy() {
        let result =
            extract_credentials(None, "/mcp", MissingCredentialPolicy::Reject, &exempt());
        assert_eq!(result, Err(AuthError::Missing));
    }

    #[test]
    fn well_formed_header_yields_credential_pair() {
        let pair = extract_credentials(
            Some("Bearer abc123:xyz789"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        )
        .expect("extraction succeeds")
        .expect("credentials present");
        assert_eq!(pair.auth_token(), "abc123");
        assert_eq!(pair.csrf_token(), "xyz789");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let result = extract_credentials(
            Some("bEaReR abc:xyz"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert!(matches!(result, Ok(Some(_))));
    }

    #[test]
    fn missing_scheme_is_malformed() {
        let result = extract_credentials(
            Some("abc123:xyz789"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::Malformed));
    }

    #[test]
    fn extra_parts_are_malformed() {
        let result = extract_credentials(
            Some("Bearer abc:xyz trailing"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::Malformed));
    }

    #[test]
    fn missing_colon_is_invalid_token() {
        let result = extract_credentials(
            Some("Bearer abc123xyz789"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn empty_auth_token_is_invalid_token() {
        let result = extract_credentials(
            Some("Bearer :xyz789"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn empty_csrf_token_is_invalid_token() {
        let result = extract_credentials(
            Some("Bearer abc123:"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_splits_on_first_colon_only() {
        let pair = extract_credentials(
            Some("Bearer auth:csrf:extra"),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        )
        .expect("extraction succeeds")
        .expect("credentials present");
        assert_eq!(pair.auth_token(), "auth");
        assert_eq!(pair.csrf_token(), "csrf:extra");
    }

    #[test]
    fn oversized_header_is_malformed() {
        let header = format!("Bearer {}:x", "a".repeat(9 * 1024));
        let result = extract_credentials(
            Some(&header),
            "/mcp",
            MissingCredentialPolicy::Anonymous,
            &exempt(),
        );
        assert_eq!(result, Err(AuthError::Malformed));
    }

    #[test]
    fn unauthenticated_error_carries_the_marker() {
        let rendered = AuthError::Unauthenticated.to_string();
        assert!(rendered.contains(super::AUTH_REQUIRED_MARKER));
    }

    #[test]
    fn context_without_credentials_reads_none() {
        let context = super::RequestAuthContext::stdio();
        assert!(context.credentials().is_none());
        assert!(context.credential_fingerprint().is_none());
    }

    #[test]
    fn context_reads_its_own_pair() {
        let pair = CredentialPair::new("auth", "csrf").expect("valid pair");
        let context = super::RequestAuthContext::http(
            crate::config::ServerTransport::Http,
            None,
            Some(pair.clone()),
        );
        assert_eq!(context.credentials(), Some(&pair));
    }
}
