//! TiDB MCP Server
//!
//! Serves the `tidb_query` tool over stdio. Connection settings and write
//! permissions come from the environment (see [`tidb_mcp::config`]).

use mcp_common::ShutdownReason;
use tidb_mcp::{TidbConfig, TidbMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mcp_common::init_tracing("tidb_mcp")?;

    let config = TidbConfig::from_env()?;

    tracing::info!(
        insert = config.permissions.allow_insert,
        update = config.permissions.allow_update,
        delete = config.permissions.allow_delete,
        "Starting tidb_mcp MCP Server"
    );

    let server = TidbMcpServer::new(&config);
    let reason = mcp_common::serve_stdio(server.clone()).await?;

    server.close().await;

    tracing::info!(?reason, "Server shut down");

    // The stdin reader is still parked on a blocking read; returning would
    // wait for it until the client closes the pipe
    if reason == ShutdownReason::Interrupted {
        std::process::exit(0);
    }
    Ok(())
}
