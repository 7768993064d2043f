//! Server configuration

use std::time::Duration;

use serde::Deserialize;

/// Environment variable prefix, e.g. `KRR_MCP_HTTP_PORT`
const ENV_PREFIX: &str = "KRR_MCP";

/// Server configuration
///
/// Loaded once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Path the streamable HTTP MCP endpoint is mounted at
    #[serde(default = "default_mcp_path")]
    pub mcp_path: String,

    /// MCP server mode: "http" or "stdio"
    #[serde(default = "default_mcp_mode")]
    pub mcp_mode: String,

    /// Path to the KRR executable (resolved on PATH when not absolute)
    #[serde(default = "default_krr_path")]
    pub krr_path: String,

    /// Default scan timeout in seconds, used when the caller sets no deadline
    #[serde(default = "default_timeout")]
    pub default_timeout: u64,

    /// Namespace scanned when the request does not name one
    #[serde(default)]
    pub default_namespace: Option<String>,

    /// Strategy used when the request does not name one
    #[serde(default = "default_strategy")]
    pub default_strategy: Option<String>,

    /// Pass `--no-color` to KRR. Never taken from the request.
    #[serde(default = "default_no_color")]
    pub no_color: bool,

    /// Server name reported during the MCP handshake
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Server version reported during the MCP handshake
    #[serde(default = "default_server_version")]
    pub server_version: String,

    /// Seconds in-flight requests get to finish after a shutdown signal
    #[serde(default = "default_shutdown_grace_period")]
    pub shutdown_grace_period: u64,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}

fn default_mcp_mode() -> String {
    "http".to_string()
}

fn default_krr_path() -> String {
    "krr".to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_strategy() -> Option<String> {
    Some("simple".to_string())
}

fn default_no_color() -> bool {
    true
}

fn default_server_name() -> String {
    "krr-mcp-server".to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_shutdown_grace_period() -> u64 {
    30
}

impl Config {
    /// Load configuration from `KRR_MCP_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_source(source)
    }

    /// Build configuration from an already assembled `config` source
    pub fn from_source(source: config::Config) -> anyhow::Result<Self> {
        let config: Config = source.try_deserialize()?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.mcp_path.starts_with('/') || self.mcp_path.len() < 2 {
            anyhow::bail!(
                "MCP path must start with '/' and not be the root: {:?}",
                self.mcp_path
            );
        }
        Ok(())
    }

    /// Default scan timeout
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout)
    }

    /// Grace period for in-flight requests on shutdown
    pub fn shutdown_grace_period(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_period)
    }

    /// Whether the MCP server should run over stdin/stdout
    pub fn is_stdio_mode(&self) -> bool {
        self.mcp_mode.eq_ignore_ascii_case("stdio")
    }

    // An empty default means "no default", not "scan the empty namespace".
    fn normalized(mut self) -> Self {
        self.default_namespace = self.default_namespace.filter(|s| !s.trim().is_empty());
        self.default_strategy = self.default_strategy.filter(|s| !s.trim().is_empty());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            mcp_path: default_mcp_path(),
            mcp_mode: default_mcp_mode(),
            krr_path: default_krr_path(),
            default_timeout: default_timeout(),
            default_namespace: None,
            default_strategy: default_strategy(),
            no_color: default_no_color(),
            server_name: default_server_name(),
            server_version: default_server_version(),
            shutdown_grace_period: default_shutdown_grace_period(),
        }
    }
}
