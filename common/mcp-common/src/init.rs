//! Server initialization utilities
//!
//! Provides tracing setup and the stdio serving loop shared by the
//! workspace's MCP servers.

use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Logs go to stderr (stdout is reserved for MCP protocol) with:
/// - Formatted output without ANSI colors
/// - Environment-based filtering via RUST_LOG
/// - Default log level of `info` for the specified crate and for this one,
///   so the serving loop's lifecycle events show up
///
/// Set `LOG_FORMAT=json` for structured JSON output.
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for directive in default_directives(crate_name) {
        filter = filter.add_directive(directive.parse()?);
    }

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

fn default_directives(crate_name: &str) -> Vec<String> {
    vec![
        format!("{}=info", crate_name),
        format!("{}=info", env!("CARGO_CRATE_NAME")),
    ]
}

/// Why [`serve_stdio`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The client closed the transport
    TransportClosed,
    /// The process received an interrupt (Ctrl-C / SIGINT)
    Interrupted,
}

/// Serve an MCP server over stdio until the client disconnects or the
/// process is interrupted
///
/// The interrupt handler is armed before the initialize handshake, so an
/// early Ctrl-C takes the same path. On interrupt the running service is
/// dropped, which cancels the transport. The stdin reader stays blocked on a
/// read that cannot be cancelled, so after releasing its own resources the
/// caller must exit the process on [`ShutdownReason::Interrupted`] rather than
/// wait for the runtime to wind down.
pub async fn serve_stdio<S>(server: S) -> anyhow::Result<ShutdownReason>
where
    S: rmcp::ServerHandler,
{
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let service = tokio::select! {
        service = server.serve(rmcp::transport::stdio()) => service?,
        signal = &mut interrupt => {
            signal?;
            tracing::info!("Interrupt received before client initialized");
            return Ok(ShutdownReason::Interrupted);
        }
    };

    tracing::info!("Server running, waiting for requests...");

    tokio::select! {
        quit = service.waiting() => {
            quit?;
            tracing::info!("Transport closed by client");
            Ok(ShutdownReason::TransportClosed)
        }
        signal = &mut interrupt => {
            signal?;
            tracing::info!("Interrupt received, closing transport");
            Ok(ShutdownReason::Interrupted)
        }
    }
}
