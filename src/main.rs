//! mockery-mcp-server
//!
//! Runs the MCP server on a WebSocket port or on stdio.

use {
    anyhow::Result,
    clap::Parser,
    mockery_mcp::{
        logging,
        settings::{ServerSettings, TransportMode},
        McpServer,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = ServerSettings::parse();
    logging::init_tracing(&settings.log_level, settings.log_format)?;

    let server = McpServer::from_settings(&settings);
    match settings.transport()? {
        TransportMode::Stdio => server.run_stdio().await,
        TransportMode::Socket(addr) => server.start(addr).await,
    }
}
