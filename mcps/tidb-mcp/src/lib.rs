//! TiDB MCP Library
//!
//! A single-tool MCP server that runs SQL against TiDB. INSERT, UPDATE and
//! DELETE are refused unless enabled through configuration; database errors
//! come back to the caller as error results rather than failed calls.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use tidb_mcp::{TidbConfig, TidbMcpServer};
//!
//! let config = TidbConfig::from_env()?;
//! let server = TidbMcpServer::new(&config);
//! // Use with in-memory transport or serve via stdio
//! ```

pub mod config;
pub mod db;
pub mod dispatch;
pub mod guard;
pub mod params;
pub mod server;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main server type
pub use server::TidbMcpServer;

pub use config::{ConnectionConfig, TidbConfig};
pub use db::{MySqlExecutor, QueryError, QueryExecutor, QueryOutput};
pub use dispatch::{DispatchOutcome, QueryDispatcher};
pub use guard::{classify, is_single_statement, Mutation, PermissionPolicy, StatementKind};
pub use params::QueryParams;
pub use types::ConfigError;
