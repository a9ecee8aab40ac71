/// Configuration management for projboard
///
/// Handles server configuration, database connection and session parameters.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration for the user/project document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite://data/projboard.db" or "sqlite::memory:")
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds
    pub ttl_secs: u64,
    /// Mark the cookie `Secure` (HTTPS only)
    pub secure: bool,
    /// Seconds between sweeps of expired sessions
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Configuration backed by a private in-memory database
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        config
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("PROJBOARD_HOST", "0.0.0.0"),
                port: env_or("PROJBOARD_PORT", "3004").parse().unwrap_or(3004),
            },
            database: DatabaseConfig {
                url: env_or("PROJBOARD_DATABASE_URL", "sqlite://data/projboard.db"),
                max_connections: env_or("PROJBOARD_DB_MAX_CONNECTIONS", "5")
                    .parse()
                    .unwrap_or(5),
            },
            session: SessionConfig {
                cookie_name: "projboard.sid".to_string(),
                ttl_secs: env_or("PROJBOARD_SESSION_TTL_SECS", "86400")
                    .parse()
                    .unwrap_or(86400),
                secure: env_or("PROJBOARD_SECURE_COOKIES", "false")
                    .parse()
                    .unwrap_or(false),
                cleanup_interval_secs: env_or("PROJBOARD_SESSION_CLEANUP_SECS", "300")
                    .parse()
                    .unwrap_or(300),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
