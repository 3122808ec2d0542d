//! Bocha Search MCP Server
//!
//! Serves the Bocha AI web search API as an MCP tool over stdio.
//!
//! # Configuration
//! Set `BOCHA_API_KEY`, or pass `--config <file>` / `CONFIG_FILE`.

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use std::path::PathBuf;

use bocha_search_mcp::{telemetry, BochaSearchMcpServer, Config};

#[derive(Debug, Parser)]
#[command(name = "bocha-search-mcp", version, about = "Bocha AI web search MCP server")]
struct Cli {
    /// TOML configuration file (must be inside the working directory)
    #[arg(long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing("bocha_search_mcp")?;

    tracing::info!("Starting Bocha Search MCP Server");

    let config = Config::load(cli.config.as_deref())?;
    if let Err(e) = config.validate() {
        tracing::error!("Configuration error: {:#}. Please set the BOCHA_API_KEY environment variable.", e);
        return Err(e);
    }

    let server = BochaSearchMcpServer::new(&config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!(
        name = %config.server_name,
        version = %config.server_version,
        "Server running, waiting for requests..."
    );
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
