//! Stored procedure MCP server entry point.
//!
//! This binary starts the MCP server using stdio transport for integration
//! with Claude Desktop, Cursor, and other MCP clients.

use anyhow::Result;
use mcpkit::prelude::*;
use mcpkit::transport::stdio::StdioTransport;
use mssql_procedure_mcp::{Config, ProcedureMcpServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout is reserved for JSON-RPC)
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    eprintln!("MSSQL Procedure MCP Server v{version} starting...");
    eprintln!("Transport: stdio");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] {}", info);
    }));

    let config = Config::from_env()?;
    eprintln!("Configuration loaded successfully");

    let server = ProcedureMcpServer::new(config).await?;
    eprintln!(
        "Server initialized for {}. Ready to accept requests...",
        server.config().database.server_label()
    );

    let service = ServerBuilder::new(server.clone())
        .with_tools(server)
        .build()
        .serve(StdioTransport::new());

    tokio::select! {
        result = service => {
            match result {
                Ok(()) => eprintln!("Service stopped"),
                Err(e) => eprintln!("Service error: {e}"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Shutdown signal received");
        }
    }

    eprintln!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,mssql_procedure_mcp=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
