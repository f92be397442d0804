// chirp-gate-mcp/src/lib.rs
// ============================================================================
// Module: Chirp Gate MCP
// Description: MCP server and credential propagation for Chirp Gate.
// Purpose: Provide MCP tool adapters over the platform capability seam.
// Dependencies: chirp-gate-core, chirp-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! Chirp Gate MCP exposes the platform tool catalog through MCP tools over
//! stdio, HTTP, and SSE transports. Every tool call runs under the
//! credentials extracted from its own request: the transport boundary parses
//! the `Authorization` header once, binds the result into an immutable
//! per-request [`auth::RequestAuthContext`], and the router builds one
//! ephemeral platform session per call from that context. No credential state
//! is shared between in-flight requests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod config;
pub mod platform_http;
pub mod server;
pub mod tools;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::AuthAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ToolAuditEvent;
pub use auth::AUTH_REQUIRED_MARKER;
pub use auth::AuthError;
pub use auth::RequestAuthContext;
pub use auth::extract_credentials;
pub use config::ChirpGateConfig;
pub use platform_http::HttpPlatformConnector;
pub use server::McpServer;
pub use tools::ToolDefinition;
pub use tools::ToolError;
pub use tools::ToolName;
pub use tools::ToolRouter;
pub use validation::ValidationError;
pub use validation::bounded_count;
