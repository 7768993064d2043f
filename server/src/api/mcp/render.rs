//! Rendering of scan results and failures into tool output text

use crate::domain::scan::ScanResult;
use crate::error::{Error, Result};

/// Prefix of every successful scan response
pub const RESULT_HEADER: &str = "KRR Scan Results:\n\n";

const INSTALL_HINT: &str = "\n\nKRR CLI is not installed or not in PATH. Please install it with:\n  \
pip install krr\n\nThen verify installation with:\n  krr --version";

/// Render a successful scan.
///
/// Table and YAML output is relayed as-is; JSON output is re-serialized
/// from the whole result.
pub fn render_result(result: &ScanResult) -> Result<String> {
    if result.output.is_raw() {
        return Ok(format!("{}{}", RESULT_HEADER, result.raw_output));
    }

    let json = serde_json::to_string_pretty(result)?;
    Ok(format!("{}{}", RESULT_HEADER, json))
}

/// Render a failed scan, with install guidance when KRR is missing
pub fn render_failure(err: &Error) -> String {
    let mut message = format!("KRR scan failed: {}", err);
    if err.is_not_found() {
        message.push_str(INSTALL_HINT);
    }
    message
}
