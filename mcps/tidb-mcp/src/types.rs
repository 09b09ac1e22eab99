//! Error types for the TiDB MCP server

use thiserror::Error;

/// Startup configuration errors. Any of these stops the server from starting.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required TiDB connection environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid TIDB_PORT '{0}': expected a port number between 0 and 65535")]
    InvalidPort(String),

    #[error("Invalid TIDB_POOL_SIZE '{0}': expected a positive integer")]
    InvalidPoolSize(String),
}
