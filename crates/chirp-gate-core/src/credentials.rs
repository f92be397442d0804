// chirp-gate-core/src/credentials.rs
// ============================================================================
// Module: Credential Pair
// Description: Per-request platform credentials for Chirp Gate tool calls.
// Purpose: Carry opaque caller-supplied session tokens with a non-empty invariant.
// Dependencies: sha2, thiserror
// ============================================================================

//! ## Overview
//! A [`CredentialPair`] holds the `auth_token`/`csrf_token` values that
//! identify an end-user session on the external platform. The pair is
//! constructed once per inbound request, threaded through that request's
//! processing, and dropped when the request completes. Both fields are
//! validated non-empty at construction; nothing else about the tokens is
//! inspected here. Token material never appears in `Debug` output or audit
//! logs; callers log the [`CredentialPair::fingerprint`] instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Credential Pair
// ============================================================================

/// Opaque platform session credentials supplied by the caller on one request.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    /// Platform session token.
    auth_token: String,
    /// CSRF token paired with the session token.
    csrf_token: String,
}

impl CredentialPair {
    /// Builds a credential pair, enforcing the non-empty invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when either token is empty.
    pub fn new(
        auth_token: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let auth_token = auth_token.into();
        let csrf_token = csrf_token.into();
        if auth_token.is_empty() {
            return Err(CredentialError::EmptyAuthToken);
        }
        if csrf_token.is_empty() {
            return Err(CredentialError::EmptyCsrfToken);
        }
        Ok(Self {
            auth_token,
            csrf_token,
        })
    }

    /// Returns the platform session token.
    #[must_use]
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Returns the CSRF token.
    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// Returns a sha256 fingerprint of the pair for audit labeling.
    ///
    /// The fingerprint covers both tokens so distinct pairs sharing a session
    /// token remain distinguishable in audit logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.auth_token.as_bytes());
        hasher.update(b":");
        hasher.update(self.csrf_token.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = fmt::Write::write_fmt(&mut out, format_args!("{byte:02x}"));
        }
        out
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("auth_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Credential construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The auth token was empty.
    #[error("auth token must not be empty")]
    EmptyAuthToken,
    /// The CSRF token was empty.
    #[error("csrf token must not be empty")]
    EmptyCsrfToken,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
