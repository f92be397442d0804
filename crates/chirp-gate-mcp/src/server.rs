// chirp-gate-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio, HTTP, and SSE transports.
// Purpose: Expose Chirp Gate tools via JSON-RPC 2.0.
// Dependencies: chirp-gate-core, axum, tokio
// ============================================================================

//! ## Overview
//! The MCP server exposes the gateway tools using JSON-RPC 2.0 over stdio,
//! HTTP, and SSE transports; HTTP and SSE serve `POST /mcp` plus an
//! unauthenticated `GET /health` probe. Credential extraction runs exactly
//! once per inbound request at this boundary: a malformed or invalid header
//! terminates the request with 401 before any tool logic runs, and a
//! successful extraction binds the pair into that request's own
//! [`RequestAuthContext`]. All calls route through
//! [`crate::tools::ToolRouter`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio_stream::wrappers::ReceiverStream;

use crate::audit::AuditSink;
use crate::audit::AuthAuditEvent;
use crate::audit::StderrAuditSink;
use crate::auth::RequestAuthContext;
use crate::auth::extract_credentials;
use crate::config::ChirpGateConfig;
use crate::config::MissingCredentialPolicy;
use crate::config::ServerTransport;
use crate::platform_http::HttpPlatformConnector;
use crate::tools::ToolDefinition;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: ChirpGateConfig,
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Audit sink for boundary decisions.
    audit: Arc<dyn AuditSink>,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: ChirpGateConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let connector = HttpPlatformConnector::from_config(&config.platform)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let audit: Arc<dyn AuditSink> = Arc::new(StderrAuditSink);
        let router = ToolRouter::new(Arc::new(connector), Arc::clone(&audit))
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        Ok(Self {
            config,
            router,
            audit,
        })
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let transport = self.config.server.transport;
        let max_body_bytes = self.config.server.max_body_bytes;
        match transport {
            ServerTransport::Stdio => serve_stdio(&self.router, max_body_bytes).await,
            ServerTransport::Http | ServerTransport::Sse => {
                serve_network(self.config, self.router, self.audit, transport).await
            }
        }
    }
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout. Stdio requests carry no
/// Authorization header, so every request runs under an anonymous context
/// and the tool layer demands credentials.
async fn serve_stdio(router: &ToolRouter, max_body_bytes: usize) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    loop {
        let Some(bytes) = read_framed(&mut reader, max_body_bytes).await? else {
            return Ok(());
        };
        let request: JsonRpcRequest = serde_json::from_slice(&bytes)
            .map_err(|_| McpServerError::Transport("invalid json-rpc request".to_string()))?;
        let context = RequestAuthContext::stdio();
        let response = handle_request(router, &context, request).await;
        let payload = serde_json::to_vec(&response.1)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload).await?;
    }
}

// ============================================================================
// SECTION: HTTP and SSE Transports
// ============================================================================

/// Serves JSON-RPC requests over HTTP or SSE.
async fn serve_network(
    config: ChirpGateConfig,
    router: ToolRouter,
    audit: Arc<dyn AuditSink>,
    transport: ServerTransport,
) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let state = Arc::new(ServerState {
        router,
        audit,
        transport,
        max_body_bytes: config.server.max_body_bytes,
        missing_credentials: config.server.auth.missing_credentials,
        exempt_paths: config.server.auth.exempt_paths.clone(),
    });
    let rpc_handler = match transport {
        ServerTransport::Sse => post(handle_sse),
        _ => post(handle_http),
    };
    let app = Router::new()
        .route("/mcp", rpc_handler)
        .route("/health", get(handle_health))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("bind failed".to_string()))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|_| McpServerError::Transport("server failed".to_string()))
}

/// Shared server state for HTTP/SSE handlers.
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Audit sink for boundary decisions.
    audit: Arc<dyn AuditSink>,
    /// Transport served by this instance.
    transport: ServerTransport,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Boundary policy for absent Authorization headers.
    missing_credentials: MissingCredentialPolicy,
    /// Request paths served without credential extraction.
    exempt_paths: Vec<String>,
}

/// Handles unauthenticated health probes.
async fn handle_health() -> impl IntoResponse {
    axum::Json(json!({ "status": "ok" }))
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let context = match bind_request_context(&state, peer, &uri, &headers) {
        Ok(context) => context,
        Err(response) => return response,
    };
    let response = parse_request(&state, &context, &bytes).await;
    (response.0, axum::Json(response.1)).into_response()
}

/// Handles SSE JSON-RPC requests.
async fn handle_sse(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let context = match bind_request_context(&state, peer, &uri, &headers) {
        Ok(context) => context,
        Err(response) => return response,
    };
    let response = parse_request(&state, &context, &bytes).await;
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<Event, Infallible>>(1);
    let payload = serde_json::to_string(&response.1).unwrap_or_else(|_| {
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32060,\"message\":\"serialization \
         failed\"}}"
            .to_string()
    });
    let _ = tx.send(Ok(Event::default().data(payload))).await;
    Sse::new(ReceiverStream::new(rx)).into_response()
}

/// Runs credential extraction once at the boundary and binds the result into
/// the request's own context. Extraction failures terminate the request with
/// a 401 JSON body before any tool logic runs.
fn bind_request_context(
    state: &ServerState,
    peer: SocketAddr,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<RequestAuthContext, Response> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    match extract_credentials(
        auth_header,
        uri.path(),
        state.missing_credentials,
        &state.exempt_paths,
    ) {
        Ok(credentials) => {
            let context = RequestAuthContext::http(state.transport, Some(peer.ip()), credentials);
            state.audit.record_auth(&AuthAuditEvent::allowed(&context, uri.path()));
            Ok(context)
        }
        Err(err) => {
            state.audit.record_auth(&AuthAuditEvent::denied(
                state.transport,
                Some(peer.ip()),
                uri.path(),
                &err,
            ));
            Err((
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({ "error": err.to_string() })),
            )
                .into_response())
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// JSON tool output.
    Json {
        /// JSON payload.
        json: Value,
    },
}

/// Dispatches a JSON-RPC request to the tool router.
async fn handle_request(
    router: &ToolRouter,
    base_context: &RequestAuthContext,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    let context = base_context.clone().with_request_id(request.id.to_string());
    if request.jsonrpc != "2.0" {
        return (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32600,
                    message: "invalid json-rpc version".to_string(),
                }),
            },
        );
    }
    match request.method.as_str() {
        "tools/list" => {
            let tools = router.list_tools();
            match serde_json::to_value(ToolListResult {
                tools,
            }) {
                Ok(value) => (
                    StatusCode::OK,
                    JsonRpcResponse {
                        jsonrpc: "2.0",
                        id: request.id,
                        result: Some(value),
                        error: None,
                    },
                ),
                Err(_) => jsonrpc_error(request.id, &ToolError::Serialization),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            let call = serde_json::from_value::<ToolCallParams>(params);
            match call {
                Ok(call) => {
                    match router.handle_tool_call(&context, &call.name, call.arguments).await {
                        Ok(result) => match serde_json::to_value(ToolCallResult {
                            content: vec![ToolContent::Json {
                                json: result,
                            }],
                        }) {
                            Ok(value) => (
                                StatusCode::OK,
                                JsonRpcResponse {
                                    jsonrpc: "2.0",
                                    id,
                                    result: Some(value),
                                    error: None,
                                },
                            ),
                            Err(_) => jsonrpc_error(id, &ToolError::Serialization),
                        },
                        Err(err) => jsonrpc_error(id, &err),
                    }
                }
                Err(_) => (
                    StatusCode::BAD_REQUEST,
                    JsonRpcResponse {
                        jsonrpc: "2.0",
                        id,
                        result: None,
                        error: Some(JsonRpcError {
                            code: -32602,
                            message: "invalid tool params".to_string(),
                        }),
                    },
                ),
            }
        }
        _ => (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: request.id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: "method not found".to_string(),
                }),
            },
        ),
    }
}

/// Parses and validates a JSON-RPC request payload.
async fn parse_request(
    state: &ServerState,
    context: &RequestAuthContext,
    bytes: &Bytes,
) -> (StatusCode, JsonRpcResponse) {
    if bytes.len() > state.max_body_bytes {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: Value::Null,
                result: None,
                error: Some(JsonRpcError {
                    code: -32070,
                    message: "request body too large".to_string(),
                }),
            },
        );
    }
    match serde_json::from_slice::<JsonRpcRequest>(bytes.as_ref()) {
        Ok(request) => handle_request(&state.router, context, request).await,
        Err(_) => (
            StatusCode::BAD_REQUEST,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id: Value::Null,
                result: None,
                error: Some(JsonRpcError {
                    code: -32600,
                    message: "invalid json-rpc request".to_string(),
                }),
            },
        ),
    }
}

/// Builds a JSON-RPC error response for a tool failure.
fn jsonrpc_error(id: Value, error: &ToolError) -> (StatusCode, JsonRpcResponse) {
    let (status, code) = match error {
        ToolError::UnknownTool => (StatusCode::BAD_REQUEST, -32601),
        ToolError::Unauthenticated => (StatusCode::UNAUTHORIZED, -32001),
        ToolError::InvalidParams(_) | ToolError::Validation(_) => {
            (StatusCode::BAD_REQUEST, -32602)
        }
        ToolError::Upstream(_) => (StatusCode::OK, -32030),
        ToolError::Internal(_) => (StatusCode::OK, -32050),
        ToolError::Serialization => (StatusCode::OK, -32060),
    };
    (
        status,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: error.to_string(),
            }),
        },
    )
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed stdio payload using MCP Content-Length headers. Returns
/// `None` on a clean end of stream before any header line.
async fn read_framed(
    reader: &mut BufReader<impl AsyncRead + Unpin>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if content_length.is_none() {
                return Ok(None);
            }
            return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
async fn write_framed(
    writer: &mut (impl AsyncWrite + Unpin),
    payload: &[u8],
) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .flush()
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
