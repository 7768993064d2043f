//! MCP Tool Parameter Types

use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct KrrScanParams {
    /// Kubernetes namespace to scan
    #[schemars(
        description = "Kubernetes namespace to scan (optional, scans all namespaces if not specified)"
    )]
    pub namespace: Option<String>,

    /// kubeconfig context
    #[schemars(
        description = "Kubernetes context to use (optional, uses current context if not specified)"
    )]
    pub context: Option<String>,

    /// Cluster name for reporting
    #[schemars(description = "Name of the cluster for reporting purposes (optional)")]
    pub cluster_name: Option<String>,

    /// Recommendation strategy
    #[schemars(description = "Recommendation strategy to use (e.g. 'simple')")]
    pub strategy: Option<String>,

    #[schemars(description = "Minimum CPU recommendation threshold (e.g. '100m')")]
    pub cpu_min: Option<String>,

    #[schemars(description = "Maximum CPU recommendation threshold (e.g. '2')")]
    pub cpu_max: Option<String>,

    #[schemars(description = "Minimum memory recommendation threshold (e.g. '128Mi')")]
    pub memory_min: Option<String>,

    #[schemars(description = "Maximum memory recommendation threshold (e.g. '4Gi')")]
    pub memory_max: Option<String>,

    /// Accepted for compatibility, never forwarded
    #[schemars(description = "Output format (fixed to 'table' - this parameter is ignored)")]
    pub output_format: Option<String>,

    #[schemars(
        description = "Only show resources that have recommendations (default: false)"
    )]
    pub recommend_only: Option<bool>,

    #[schemars(description = "Enable verbose output (default: false)")]
    pub verbose: Option<bool>,

    /// Per-request executable override
    #[schemars(description = "Override the path to the KRR CLI executable (optional)")]
    pub krr_path: Option<String>,
}

/// Structured payload of a successful `krr_scan` call
#[derive(Debug, Clone, Serialize)]
pub struct KrrScanOutput {
    /// Rendered scan output
    pub result: String,
}
