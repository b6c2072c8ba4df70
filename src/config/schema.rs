//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the chain gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// RPC endpoints; repeated chain ids form an ordered failover list.
    pub chains: Vec<ChainConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Service discovery registration.
    pub registry: RegistryConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Service name used for logging and registration.
    pub name: String,

    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Whole-request timeout in seconds, enforced by the HTTP layer.
    pub request_timeout_secs: u64,

    /// Deadline for one upstream height query in seconds. Must be below
    /// `request_timeout_secs` so a stalled node surfaces as a gateway timeout.
    pub query_timeout_secs: u64,

    /// IP advertised to the registry. Detected when unset.
    pub register_ip: Option<String>,

    /// Service version reported in logs.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "chain-gateway".to_string(),
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 30,
            query_timeout_secs: 10,
            register_ip: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One RPC endpoint serving one chain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChainConfig {
    /// Chain ID (e.g., 1 for Ethereum mainnet, 56 for BSC).
    pub chain_id: u64,

    /// Human readable chain name (e.g., "eth_mainnet").
    #[serde(default)]
    pub chain_name: String,

    /// JSON-RPC endpoint URL (http, https, ws or wss).
    pub rpc_url: String,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Sweep interval in seconds.
    pub interval_secs: u64,

    /// Per-probe deadline in seconds (dial + height query).
    pub timeout_secs: u64,

    /// Consecutive failures that are still logged; later ones are silent.
    pub warn_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            timeout_secs: 5,
            warn_threshold: 3,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Consul registration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Register with Consul on startup.
    pub enabled: bool,

    /// Consul agent base URL (e.g., "http://127.0.0.1:8500").
    pub address: String,

    /// Service tags.
    pub tags: Vec<String>,

    /// Registration attempts before giving up.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Consul health check interval in seconds.
    pub check_interval_secs: u64,

    /// Consul health check timeout in seconds.
    pub check_timeout_secs: u64,

    /// Deregister after the check stays critical this long, in seconds.
    pub deregister_after_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "http://127.0.0.1:8500".to_string(),
            tags: vec!["http".to_string(), "web3".to_string()],
            max_attempts: 5,
            base_delay_ms: 2000,
            max_delay_ms: 10_000,
            check_interval_secs: 10,
            check_timeout_secs: 5,
            deregister_after_secs: 60,
        }
    }
}
