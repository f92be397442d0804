// chirp-gate-config/src/config.rs
// ============================================================================
// Module: Chirp Gate Configuration
// Description: Configuration loading and validation for Chirp Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. The missing-credential
//! policy lives here so each deployment picks one boundary behavior
//! explicitly instead of inheriting an implicit default from the transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "chirp-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CHIRP_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of unauthenticated path allow-list entries.
pub(crate) const MAX_EXEMPT_PATHS: usize = 32;
/// Maximum length of an unauthenticated path allow-list entry.
pub(crate) const MAX_EXEMPT_PATH_LENGTH: usize = 256;
/// Minimum platform connect timeout in milliseconds.
pub(crate) const MIN_PLATFORM_CONNECT_TIMEOUT_MS: u64 = 100;
/// Maximum platform connect timeout in milliseconds.
pub(crate) const MAX_PLATFORM_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum platform request timeout in milliseconds.
pub(crate) const MIN_PLATFORM_REQUEST_TIMEOUT_MS: u64 = 500;
/// Maximum platform request timeout in milliseconds.
pub(crate) const MAX_PLATFORM_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default maximum request body size in bytes.
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default unauthenticated path allow-list.
fn default_exempt_paths() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/docs".to_string(),
        "/.well-known/health".to_string(),
    ]
}

/// Default platform connect timeout in milliseconds.
const fn default_platform_connect_timeout_ms() -> u64 {
    1_000
}

/// Default platform request timeout in milliseconds.
const fn default_platform_request_timeout_ms() -> u64 {
    10_000
}

/// Default platform API base URL.
fn default_platform_base_url() -> String {
    "https://api.twitter.com".to_string()
}

/// Default platform language tag.
fn default_platform_language() -> String {
    "en-US".to_string()
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Chirp Gate configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChirpGateConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Platform adapter configuration.
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl ChirpGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.platform.validate()?;
        Ok(())
    }
}

/// Server configuration for gateway transports.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport type for the gateway.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for HTTP or SSE transports.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Inbound credential handling configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        self.auth.validate()?;
        match self.transport {
            ServerTransport::Http | ServerTransport::Sse => {
                let bind = self.bind.as_deref().unwrap_or_default().trim();
                if bind.is_empty() {
                    return Err(ConfigError::Invalid(
                        "http/sse transport requires bind address".to_string(),
                    ));
                }
                let _: SocketAddr = bind
                    .parse()
                    .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))?;
            }
            ServerTransport::Stdio => {
                if self.bind.is_some() {
                    return Err(ConfigError::Invalid(
                        "stdio transport does not take a bind address".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Inbound credential handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Boundary behavior when no Authorization header is present.
    #[serde(default)]
    pub missing_credentials: MissingCredentialPolicy,
    /// Request paths served without credential extraction.
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            missing_credentials: MissingCredentialPolicy::default(),
            exempt_paths: default_exempt_paths(),
        }
    }
}

impl AuthConfig {
    /// Validates credential handling configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.exempt_paths.len() > MAX_EXEMPT_PATHS {
            return Err(ConfigError::Invalid("too many exempt paths".to_string()));
        }
        for path in &self.exempt_paths {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "exempt path must start with '/': {path}"
                )));
            }
            if path.len() > MAX_EXEMPT_PATH_LENGTH {
                return Err(ConfigError::Invalid("exempt path too long".to_string()));
            }
            if path.trim() != path {
                return Err(ConfigError::Invalid(
                    "exempt path must not contain surrounding whitespace".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Platform adapter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Platform API base URL.
    #[serde(default = "default_platform_base_url")]
    pub base_url: String,
    /// Platform language tag sent with each session.
    #[serde(default = "default_platform_language")]
    pub language: String,
    /// Connect timeout for platform calls, in milliseconds.
    #[serde(default = "default_platform_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout for platform calls, in milliseconds.
    #[serde(default = "default_platform_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_platform_base_url(),
            language: default_platform_language(),
            connect_timeout_ms: default_platform_connect_timeout_ms(),
            request_timeout_ms: default_platform_request_timeout_ms(),
        }
    }
}

impl PlatformConfig {
    /// Validates platform adapter configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("platform.base_url must be non-empty".to_string()));
        }
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(ConfigError::Invalid(
                "platform.base_url must be an http(s) URL".to_string(),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("platform.language must be non-empty".to_string()));
        }
        if self.connect_timeout_ms < MIN_PLATFORM_CONNECT_TIMEOUT_MS
            || self.connect_timeout_ms > MAX_PLATFORM_CONNECT_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "platform.connect_timeout_ms must be between {MIN_PLATFORM_CONNECT_TIMEOUT_MS} \
                 and {MAX_PLATFORM_CONNECT_TIMEOUT_MS}"
            )));
        }
        if self.request_timeout_ms < MIN_PLATFORM_REQUEST_TIMEOUT_MS
            || self.request_timeout_ms > MAX_PLATFORM_REQUEST_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "platform.request_timeout_ms must be between {MIN_PLATFORM_REQUEST_TIMEOUT_MS} \
                 and {MAX_PLATFORM_REQUEST_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Supported gateway transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP JSON-RPC transport.
    Http,
    /// Use SSE transport for responses.
    Sse,
}

/// Boundary behavior when a request carries no Authorization header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingCredentialPolicy {
    /// Pass through anonymously; the tool layer demands credentials.
    #[default]
    Anonymous,
    /// Reject at the boundary with a 401 before any tool logic runs.
    Reject,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
