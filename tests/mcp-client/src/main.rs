//! MCP Client Test
//!
//! Spawns the KRR MCP server in stdio mode and exercises the `krr_scan` tool.
//!
//! Environment:
//! - `MCP_SERVER_PATH`: server binary (default: target/debug/krr-mcp-server)
//! - `KRR_SCAN_NAMESPACE`: namespace to scan (default: all namespaces)
//! - `KRR_MCP_KRR_PATH`: forwarded to the server, e.g. a stub KRR script

use anyhow::Result;
use rmcp::{
    model::CallToolRequestParam,
    transport::{ConfigureCommandExt, TokioChildProcess},
    ServiceExt,
};
use serde_json::json;
use tokio::process::Command;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Helper to call a tool and print the result
async fn call_tool(
    client: &rmcp::service::RunningService<rmcp::service::RoleClient, ()>,
    name: &str,
    args: serde_json::Value,
) -> Result<(bool, String)> {
    info!("Calling tool: {}", name);
    info!("   Arguments: {}", serde_json::to_string_pretty(&args)?);

    let result = client
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        })
        .await?;

    let content = result
        .structured_content
        .as_ref()
        .and_then(|v| v["result"].as_str().map(str::to_string))
        .or_else(|| {
            result
                .content
                .first()
                .and_then(|c| c.raw.as_text())
                .map(|t| t.text.clone())
        })
        .unwrap_or_else(|| "No content".into());

    let is_error = result.is_error.unwrap_or(false);
    if is_error {
        error!("Tool error: {}", content);
    } else {
        info!("Result:\n{}", content);
    }

    Ok((is_error, content))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting MCP Client Test");

    let server_path = std::env::var("MCP_SERVER_PATH")
        .unwrap_or_else(|_| "../../target/debug/krr-mcp-server".to_string());

    info!("Connecting to MCP server: {}", server_path);

    let transport = TokioChildProcess::new(Command::new(&server_path).configure(|cmd| {
        cmd.env("KRR_MCP_MCP_MODE", "stdio");
    }))?;

    let client = ().serve(transport).await?;
    info!("Connected to MCP server");

    // Test 1: the server advertises exactly the krr_scan tool
    let tools = client.list_tools(None).await?;
    info!("Available tools ({}):", tools.tools.len());
    for tool in &tools.tools {
        info!(
            "  - {} : {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    if !tools.tools.iter().any(|t| t.name == "krr_scan") {
        anyhow::bail!("krr_scan tool is not registered");
    }

    // Test 2: a scan with caller parameters
    let mut args = json!({
        "strategy": "simple",
        "output_format": "json",
    });
    if let Ok(namespace) = std::env::var("KRR_SCAN_NAMESPACE") {
        args["namespace"] = json!(namespace);
    }
    let (is_error, content) = call_tool(&client, "krr_scan", args).await?;
    if !is_error && !content.starts_with("KRR Scan Results:") {
        anyhow::bail!("unexpected scan output: {}", content);
    }

    // Test 3: a missing executable is a tool error, and the session survives it
    let (is_error, content) = call_tool(
        &client,
        "krr_scan",
        json!({ "krr_path": "/nonexistent/krr" }),
    )
    .await?;
    if !is_error || !content.contains("pip install krr") {
        anyhow::bail!("expected not-found error with install hint, got: {}", content);
    }
    client.list_tools(None).await?;

    info!("All checks passed");
    client.cancel().await?;

    Ok(())
}
