//! Configuration for TiDB MCP Server
//!
//! Read once from the environment at startup:
//!
//! | Variable                 | Required | Default  |
//! |--------------------------|----------|----------|
//! | `TIDB_HOST`              | yes      |          |
//! | `TIDB_PORT`              | yes      |          |
//! | `TIDB_USER`              | yes      |          |
//! | `TIDB_PASS`              | yes      |          |
//! | `TIDB_DB`                | yes      |          |
//! | `TIDB_POOL_SIZE`         | no       | `5`      |
//! | `TIDB_TIMEZONE`          | no       | `+08:00` |
//! | `ALLOW_INSERT_OPERATION` | no       | `false`  |
//! | `ALLOW_UPDATE_OPERATION` | no       | `false`  |
//! | `ALLOW_DELETE_OPERATION` | no       | `false`  |
//!
//! A permission flag is enabled only by the exact value `true`.

use std::fmt;

use crate::guard::PermissionPolicy;
use crate::types::ConfigError;

const DEFAULT_POOL_SIZE: u32 = 5;
const DEFAULT_TIMEZONE: &str = "+08:00";

/// Connection settings for the TiDB pool
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// Session time zone set on every connection
    pub timezone: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("timezone", &self.timezone)
            .finish()
    }
}

/// Full server configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidbConfig {
    pub connection: ConnectionConfig,
    pub permissions: PermissionPolicy,
}

impl TidbConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        // All five are checked before any is parsed
        let host = required("TIDB_HOST")?;
        let port = required("TIDB_PORT")?;
        let user = required("TIDB_USER")?;
        let password = required("TIDB_PASS")?;
        let database = required("TIDB_DB")?;

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;

        let pool_size = match lookup("TIDB_POOL_SIZE").filter(|v| !v.trim().is_empty()) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidPoolSize(raw)),
            },
            None => DEFAULT_POOL_SIZE,
        };

        let timezone = lookup("TIDB_TIMEZONE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let flag = |key: &str| lookup(key).as_deref() == Some("true");

        Ok(Self {
            connection: ConnectionConfig {
                host,
                port,
                user,
                password,
                database,
                pool_size,
                timezone,
            },
            permissions: PermissionPolicy {
                allow_insert: flag("ALLOW_INSERT_OPERATION"),
                allow_update: flag("ALLOW_UPDATE_OPERATION"),
                allow_delete: flag("ALLOW_DELETE_OPERATION"),
            },
        })
    }
}
