//! MCP (Model Context Protocol) API layer
//!
//! This module provides the MCP server, exposing KRR scans to AI assistants
//! as the `krr_scan` tool over streamable HTTP or stdio.

mod handler;
mod render;
mod types;

pub use handler::KrrMcpHandler;

use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;
use tracing::info;

use crate::AppState;

/// Start MCP server in stdio mode
///
/// This runs the MCP server using stdin/stdout for communication,
/// suitable for local CLI usage with AI assistants.
pub async fn serve_stdio(state: AppState) -> anyhow::Result<()> {
    info!("Starting MCP server in stdio mode");

    let handler = KrrMcpHandler::new(state);
    let service = handler.serve(stdio()).await?;

    info!("MCP server ready, waiting for requests...");
    service.waiting().await?;

    info!("MCP server shutdown");
    Ok(())
}

/// Streamable HTTP service, one handler per session
pub fn create_mcp_service(state: AppState) -> StreamableHttpService<KrrMcpHandler> {
    StreamableHttpService::new(
        move || Ok(KrrMcpHandler::new(state.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    )
}
