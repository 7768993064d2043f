//! MCP Server Handler implementation
//!
//! Exposes the `krr_scan` tool: resolves request parameters against the
//! configured defaults, runs the executor and renders the outcome. Every
//! failure becomes a tool-level error result so the session stays usable.

use std::future::Future;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use tracing::{error, info, warn};

use super::render::{render_failure, render_result};
use super::types::{KrrScanOutput, KrrScanParams};
use crate::config::Config;
use crate::domain::scan::{OutputFormat, ScanOptions};
use crate::service::executor::{CliExecutor, Executor, ScanContext};
use crate::AppState;

const CANCELLED_MESSAGE: &str = "KRR scan cancelled by client";

/// MCP Handler for KRR scans
#[derive(Clone)]
pub struct KrrMcpHandler {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

impl KrrMcpHandler {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Run one scan and turn the outcome into a tool result
    pub async fn scan(&self, params: KrrScanParams, ctx: ScanContext) -> CallToolResult {
        let options = resolve_options(&params, &self.state.config);

        let override_executor = krr_path_override(&params)
            .map(|path| CliExecutor::new(path, self.state.config.default_timeout()));
        let executor: &dyn Executor = match &override_executor {
            Some(executor) => {
                info!("MCP: krr_scan using executable {}", executor.krr_path());
                executor
            }
            None => self.state.executor.as_ref(),
        };

        let result = match executor.scan(&ctx, &options).await {
            Ok(result) => result,
            Err(e) => {
                error!("MCP: krr_scan failed [{}]: {}", e.code(), e);
                return CallToolResult::error(vec![Content::text(render_failure(&e))]);
            }
        };

        match render_result(&result) {
            Ok(text) => success(text),
            Err(e) => {
                error!("MCP: krr_scan render failed: {}", e);
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    /// Run a scan unless `cancelled` resolves first.
    ///
    /// Losing the race drops the scan, which kills the KRR process group.
    pub async fn scan_until<F>(
        &self,
        params: KrrScanParams,
        ctx: ScanContext,
        cancelled: F,
    ) -> CallToolResult
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.scan(params, ctx) => result,
            _ = cancelled => {
                warn!("MCP: krr_scan cancelled by client");
                CallToolResult::error(vec![Content::text(CANCELLED_MESSAGE)])
            }
        }
    }
}

#[tool_router]
impl KrrMcpHandler {
    #[tool(
        description = "Execute a KRR (Kubernetes Resource Recommender) scan to analyze resource usage and get recommendations"
    )]
    async fn krr_scan(
        &self,
        Parameters(params): Parameters<KrrScanParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            "MCP: krr_scan namespace={:?} strategy={:?}",
            params.namespace, params.strategy
        );

        Ok(self
            .scan_until(params, ScanContext::default(), context.ct.cancelled())
            .await)
    }
}

#[tool_handler]
impl ServerHandler for KrrMcpHandler {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.state.config.server_name.clone();
        server_info.version = self.state.config.server_version.clone();

        ServerInfo {
            server_info,
            instructions: Some(
                "KRR MCP Server - Run KRR (Kubernetes Resource Recommender) scans. \
                Use krr_scan to get CPU and memory request/limit recommendations \
                for workloads in a namespace or the whole cluster."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Merge request parameters over the configured defaults.
///
/// Namespace and strategy fall back to the configuration; the output format
/// is always table and no-color always comes from the configuration.
pub fn resolve_options(params: &KrrScanParams, config: &Config) -> ScanOptions {
    if let Some(requested) = &params.output_format {
        if requested.parse::<OutputFormat>() != Ok(OutputFormat::Table) {
            warn!(
                "MCP: krr_scan output_format={:?} ignored, using table",
                requested
            );
        }
    }

    ScanOptions {
        namespace: params
            .namespace
            .clone()
            .or_else(|| config.default_namespace.clone()),
        context: params.context.clone(),
        cluster_name: params.cluster_name.clone(),
        strategy: params
            .strategy
            .clone()
            .or_else(|| config.default_strategy.clone()),
        cpu_min: params.cpu_min.clone(),
        cpu_max: params.cpu_max.clone(),
        memory_min: params.memory_min.clone(),
        memory_max: params.memory_max.clone(),
        output: OutputFormat::Table,
        recommend_only: params.recommend_only.unwrap_or(false),
        no_color: config.no_color,
        verbose: params.verbose.unwrap_or(false),
    }
}

fn krr_path_override(params: &KrrScanParams) -> Option<String> {
    params
        .krr_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}

fn success(result: String) -> CallToolResult {
    match serde_json::to_value(KrrScanOutput { result }) {
        Ok(value) => CallToolResult::structured(value),
        Err(e) => CallToolResult::error(vec![Content::text(format!(
            "Failed to format scan result: {}",
            e
        ))]),
    }
}
