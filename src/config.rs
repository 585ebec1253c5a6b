//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Relational store settings
    pub database: DatabaseConfig,
    /// Bearer token verification settings
    pub auth: AuthConfig,
    /// JSON export of the identity directory users
    pub staff_directory_path: Option<PathBuf>,
    /// Directory served for every path no API route matches
    pub static_dir: Option<PathBuf>,
}

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Identity provider token settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    /// App client id tokens must be issued for
    pub audience: Option<String>,
    /// Claim listing the user's groups
    pub groups_claim: String,
    /// Group granting manager routes
    pub manager_group: String,
    pub leeway_seconds: u64,
    /// Treat every request as an authenticated manager
    pub disabled: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - Postgres connection string (default: unset, in-memory store)
    /// - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
    /// - `DATABASE_ACQUIRE_TIMEOUT` - Seconds to wait for a connection (default: 5)
    /// - `RUN_MIGRATIONS` - Apply migrations at startup (default: true)
    /// - `JWT_SECRET`, `JWT_ISSUER`, `JWT_AUDIENCE` - Token verification (default: unset)
    /// - `JWT_GROUPS_CLAIM` - Groups claim name (default: cognito:groups)
    /// - `MANAGER_GROUP` - Manager group name (default: manager)
    /// - `JWT_LEEWAY` - Clock skew in seconds (default: 0)
    /// - `AUTH_DISABLED` - Skip token verification (default: false)
    /// - `STAFF_DIRECTORY_PATH` - Directory export file (default: unset)
    /// - `STATIC_DIR` - Static files directory (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            database: DatabaseConfig {
                url: string_var("DATABASE_URL"),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                acquire_timeout: parse_var("DATABASE_ACQUIRE_TIMEOUT")
                    .unwrap_or(defaults.database.acquire_timeout),
                run_migrations: parse_var("RUN_MIGRATIONS")
                    .unwrap_or(defaults.database.run_migrations),
            },
            auth: AuthConfig {
                jwt_secret: string_var("JWT_SECRET"),
                issuer: string_var("JWT_ISSUER"),
                audience: string_var("JWT_AUDIENCE"),
                groups_claim: string_var("JWT_GROUPS_CLAIM")
                    .unwrap_or(defaults.auth.groups_claim),
                manager_group: string_var("MANAGER_GROUP").unwrap_or(defaults.auth.manager_group),
                leeway_seconds: parse_var("JWT_LEEWAY").unwrap_or(defaults.auth.leeway_seconds),
                disabled: parse_var("AUTH_DISABLED").unwrap_or(defaults.auth.disabled),
            },
            staff_directory_path: string_var("STAFF_DIRECTORY_PATH").map(PathBuf::from),
            static_dir: string_var("STATIC_DIR").map(PathBuf::from),
        }
    }
}

fn string_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            staff_directory_path: None,
            static_dir: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout: 5,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            issuer: None,
            audience: None,
            groups_claim: "cognito:groups".to_string(),
            manager_group: "manager".to_string(),
            leeway_seconds: 0,
            disabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.auth.groups_claim, "cognito:groups");
        assert_eq!(config.auth.manager_group, "manager");
        assert!(!config.auth.disabled);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
        env::remove_var("MANAGER_GROUP");
        env::remove_var("AUTH_DISABLED");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.manager_group, "manager");
        assert!(!config.auth.disabled);
    }
}
