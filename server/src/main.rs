//! KRR MCP Server
//!
//! This server exposes the KRR (Kubernetes Resource Recommender) CLI as an
//! MCP tool, over streamable HTTP or stdio.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod service;

use config::Config;
use service::executor::{CliExecutor, Executor};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub executor: Arc<dyn Executor>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first to check MCP mode
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    let config = Arc::new(config);

    // Initialize tracing - use stderr for MCP stdio mode to avoid polluting stdout
    if config.is_stdio_mode() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(
                EnvFilter::builder()
                    .with_default_directive(Level::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(Level::INFO.into())
                    .from_env_lossy(),
            )
            .init();
    }

    info!(
        "Starting KRR MCP Server {} version {}",
        config.server_name, config.server_version
    );
    info!("Using KRR CLI at: {}", config.krr_path);

    let executor = Arc::new(CliExecutor::new(
        config.krr_path.clone(),
        config.default_timeout(),
    ));

    let state = AppState {
        config: config.clone(),
        executor,
    };

    if config.is_stdio_mode() {
        return api::mcp::serve_stdio(state).await;
    }

    serve_http(state).await
}

/// Serve MCP over streamable HTTP until a shutdown signal arrives.
///
/// In-flight requests get the configured grace period, after which the
/// server is dropped along with any remaining connections.
async fn serve_http(state: AppState) -> anyhow::Result<()> {
    let config = state.config.clone();
    let http_addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port).parse()?;

    let app = api::http::create_router(state);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;

    info!(
        "Server ready to accept MCP requests on http://{}{}",
        http_addr, config.mcp_path
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app.into_make_service()).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    let mut server_task = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server_task => {
            // Server stopped on its own
            if let Err(e) = result? {
                error!("HTTP server error: {}", e);
                return Err(e.into());
            }
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    let _ = shutdown_tx.send(());
    let grace = config.shutdown_grace_period();

    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(result) => {
            if let Err(e) = result? {
                error!("HTTP server error: {}", e);
            }
        }
        Err(_) => {
            warn!("Graceful shutdown exceeded {:?}, closing connections", grace);
            server_task.abort();
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
