//! Scan domain model
//!
//! `ScanOptions` is the resolved parameter set for one KRR invocation and
//! knows how to turn itself into an argument vector. `ScanResult` is what a
//! successful invocation produced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output encoding requested from KRR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }

    /// Table and YAML output is relayed verbatim
    pub fn is_raw(&self) -> bool {
        matches!(self, OutputFormat::Table | OutputFormat::Yaml)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "yaml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Resolved parameters for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Namespace to scan; `None` scans all namespaces
    pub namespace: Option<String>,
    /// kubeconfig context
    pub context: Option<String>,
    /// Cluster name used in the report
    pub cluster_name: Option<String>,
    /// Recommendation strategy; `None` leaves the choice to KRR
    pub strategy: Option<String>,
    pub cpu_min: Option<String>,
    pub cpu_max: Option<String>,
    pub memory_min: Option<String>,
    pub memory_max: Option<String>,
    pub output: OutputFormat,
    pub recommend_only: bool,
    pub no_color: bool,
    pub verbose: bool,
}

impl ScanOptions {
    /// Build the KRR argument vector.
    ///
    /// Flag order is fixed so identical options always produce identical
    /// vectors. Threshold values are passed through untouched; KRR does its
    /// own validation.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // The strategy is KRR's subcommand and must come first.
        if let Some(strategy) = &self.strategy {
            args.push(strategy.clone());
        }

        let valued = [
            ("--namespace", &self.namespace),
            ("--context", &self.context),
            ("--cluster", &self.cluster_name),
            ("--cpu-min", &self.cpu_min),
            ("--cpu-max", &self.cpu_max),
            ("--mem-min", &self.memory_min),
            ("--mem-max", &self.memory_max),
        ];
        for (flag, value) in valued {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }

        args.push("--formatter".to_string());
        args.push(self.output.as_str().to_string());

        let switches = [
            ("--recommend-only", self.recommend_only),
            ("--no-color", self.no_color),
            ("--verbose", self.verbose),
        ];
        for (flag, enabled) in switches {
            if enabled {
                args.push(flag.to_string());
            }
        }

        args
    }
}

/// Outcome of a successful scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    /// Output format KRR was asked for
    pub output: OutputFormat,
    /// Captured stdout, verbatim
    pub raw_output: String,
    /// Parsed document, present only for JSON output that parsed cleanly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<serde_json::Value>,
}

impl ScanResult {
    pub fn new(output: OutputFormat, raw_output: String) -> Self {
        let report = match output {
            OutputFormat::Json => serde_json::from_str(&raw_output).ok(),
            _ => None,
        };
        Self {
            output,
            raw_output,
            report,
        }
    }
}
