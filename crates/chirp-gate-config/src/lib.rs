// chirp-gate-config/src/lib.rs
// ============================================================================
// Module: Chirp Gate Config Library
// Description: Public API surface for Chirp Gate configuration.
// Purpose: Expose the canonical configuration model and validation.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed; every section carries its
//! own `validate` pass so a bad deployment never reaches the serve loop.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuthConfig;
pub use config::ChirpGateConfig;
pub use config::ConfigError;
pub use config::MissingCredentialPolicy;
pub use config::PlatformConfig;
pub use config::ServerConfig;
pub use config::ServerTransport;
