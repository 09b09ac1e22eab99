//! MCP Common - Shared utilities for MCP servers
//!
//! This crate provides the plumbing every MCP server in the workspace needs:
//!
//! - **Initialization**: [`init_tracing`] and [`serve_stdio`] for stderr logging
//!   and a stdio serving loop that stops cleanly on interrupt
//! - **Results**: helpers for building `CallToolResult` responses, including
//!   in-band tool errors
//! - **Errors**: shorthand constructors for protocol-level MCP errors
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process tool calls
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{init_tracing, serve_stdio};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init_tracing("my_mcp")?;
//!     serve_stdio(MyServer::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::invalid_params;
pub use init::{init_tracing, serve_stdio, ShutdownReason};
pub use result::{text_error, text_success};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
