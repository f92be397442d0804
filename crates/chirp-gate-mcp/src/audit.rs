// chirp-gate-mcp/src/audit.rs
// ============================================================================
// Module: Gateway Audit Logging
// Description: Structured audit events for gateway request handling.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: chirp-gate-config, serde
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for gateway request
//! logging: boundary credential decisions and per-tool-call outcomes. Events
//! never carry token material; bound credentials appear as sha256
//! fingerprints only. The module is intentionally lightweight so deployments
//! can route events to their preferred logging pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::auth::AuthError;
use crate::auth::RequestAuthContext;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Boundary credential decision event payload.
#[derive(Debug, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Decision outcome.
    decision: &'static str,
    /// Transport label.
    transport: &'static str,
    /// Caller IP address (if available).
    peer_ip: Option<String>,
    /// Request path the decision applies to.
    path: String,
    /// Bound credential fingerprint (sha256), when credentials were bound.
    credential_fingerprint: Option<String>,
    /// Failure reason (for deny events).
    reason: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allow event for a request that passed the boundary.
    #[must_use]
    pub fn allowed(context: &RequestAuthContext, path: &str) -> Self {
        Self {
            event: "gateway_auth",
            decision: "allow",
            transport: transport_label(context.transport()),
            peer_ip: context.peer_ip().map(|ip| ip.to_string()),
            path: path.to_string(),
            credential_fingerprint: context.credential_fingerprint(),
            reason: None,
        }
    }

    /// Builds a deny event for a request rejected at the boundary.
    #[must_use]
    pub fn denied(
        transport: ServerTransport,
        peer_ip: Option<std::net::IpAddr>,
        path: &str,
        error: &AuthError,
    ) -> Self {
        Self {
            event: "gateway_auth",
            decision: "deny",
            transport: transport_label(transport),
            peer_ip: peer_ip.map(|ip| ip.to_string()),
            path: path.to_string(),
            credential_fingerprint: None,
            reason: Some(error.to_string()),
        }
    }
}

/// Tool call outcome event payload.
#[derive(Debug, Serialize)]
pub struct ToolAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Tool name as requested by the caller.
    tool: String,
    /// Outcome label.
    outcome: &'static str,
    /// Normalized error kind label (for error outcomes).
    error_kind: Option<&'static str>,
    /// Transport label.
    transport: &'static str,
    /// Bound credential fingerprint (sha256), when credentials were bound.
    credential_fingerprint: Option<String>,
    /// Request identifier (if provided).
    request_id: Option<String>,
}

impl ToolAuditEvent {
    /// Builds a success event for a completed tool call.
    #[must_use]
    pub fn succeeded(context: &RequestAuthContext, tool: &str) -> Self {
        Self {
            event: "gateway_tool_call",
            tool: tool.to_string(),
            outcome: "ok",
            error_kind: None,
            transport: transport_label(context.transport()),
            credential_fingerprint: context.credential_fingerprint(),
            request_id: context.request_id().map(str::to_string),
        }
    }

    /// Builds a failure event for a tool call that returned an error.
    #[must_use]
    pub fn failed(context: &RequestAuthContext, tool: &str, error_kind: &'static str) -> Self {
        Self {
            event: "gateway_tool_call",
            tool: tool.to_string(),
            outcome: "error",
            error_kind: Some(error_kind),
            transport: transport_label(context.transport()),
            credential_fingerprint: context.credential_fingerprint(),
            request_id: context.request_id().map(str::to_string),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gateway events.
pub trait AuditSink: Send + Sync {
    /// Records a boundary credential decision.
    fn record_auth(&self, event: &AuthAuditEvent);

    /// Records a tool call outcome.
    fn record_tool(&self, event: &ToolAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event line to stderr.
    #[allow(
        clippy::print_stderr,
        reason = "Stderr is this sink's output channel by contract."
    )]
    fn write(payload: &str) {
        eprintln!("{payload}");
    }
}

impl AuditSink for StderrAuditSink {
    fn record_auth(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            Self::write(&payload);
        }
    }

    fn record_tool(&self, event: &ToolAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            Self::write(&payload);
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_auth(&self, _event: &AuthAuditEvent) {}

    fn record_tool(&self, _event: &ToolAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the stable label for a transport.
const fn transport_label(transport: ServerTransport) -> &'static str {
    match transport {
        ServerTransport::Stdio => "stdio",
        ServerTransport::Http => "http",
        ServerTransport::Sse => "sse",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
