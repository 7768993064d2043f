//! KRR executor
//!
//! Runs the KRR CLI as a child process under a deadline and classifies the
//! outcome.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::scan::{ScanOptions, ScanResult};
use crate::error::{Error, Result};

/// How long pipe readers may run on after the child has exited
const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Per-call context for a scan
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanContext {
    /// Absolute deadline; the executor's default timeout applies when unset
    pub deadline: Option<Instant>,
}

impl ScanContext {
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }
}

/// Runs KRR scans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run one scan. At most one child process is spawned per call.
    async fn scan(&self, ctx: &ScanContext, options: &ScanOptions) -> Result<ScanResult>;
}

/// Executor backed by the KRR command line tool
#[derive(Debug, Clone)]
pub struct CliExecutor {
    krr_path: String,
    default_timeout: Duration,
}

impl CliExecutor {
    /// Create a new executor
    pub fn new(krr_path: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            krr_path: krr_path.into(),
            default_timeout,
        }
    }

    pub fn krr_path(&self) -> &str {
        &self.krr_path
    }

    fn spawn(&self, args: &[String]) -> Result<Child> {
        let mut cmd = Command::new(&self.krr_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so descendants can be signalled together.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ExecutableNotFound {
                path: self.krr_path.clone(),
            },
            _ => Error::Spawn {
                path: self.krr_path.clone(),
                message: e.to_string(),
            },
        })
    }
}

#[async_trait]
impl Executor for CliExecutor {
    async fn scan(&self, ctx: &ScanContext, options: &ScanOptions) -> Result<ScanResult> {
        let started = Instant::now();
        let deadline = ctx.deadline.unwrap_or(started + self.default_timeout);
        let args = options.to_args();

        info!("Running {} {:?}", self.krr_path, args);

        let mut child = self.spawn(&args)?;
        let mut group = ProcessGroup::new(child.id());

        let stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

        let status = match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                group.kill();
                terminate(&mut child).await;
                stdout_task.abort();
                stderr_task.abort();
                warn!("{} timed out after {:?}", self.krr_path, started.elapsed());
                return Err(Error::Timeout(deadline.saturating_duration_since(started)));
            }
        };

        // Anything still in the group would hold the pipes open.
        group.kill();
        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;

        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        if !stderr.is_empty() {
            debug!("{} stderr: {}", self.krr_path, stderr.trim_end());
        }

        if !status.success() {
            return Err(Error::NonZeroExit {
                status,
                output: diagnostic_output(&stdout, &stderr),
            });
        }

        info!(
            "{} finished in {:?} ({} bytes)",
            self.krr_path,
            started.elapsed(),
            stdout.len()
        );

        Ok(ScanResult::new(options.output, stdout))
    }
}

/// Process group of a spawned child, killed when dropped.
///
/// Covers every way out of `scan`, including the future being dropped
/// mid-flight.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// SIGKILL every process in the group; later calls are no-ops
    fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }

        #[cfg(not(unix))]
        let _ = pgid;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Collect a pipe reader once the child has exited, giving up after a short wait
async fn drain(task: JoinHandle<std::io::Result<Vec<u8>>>) -> Vec<u8> {
    match tokio::time::timeout(PIPE_DRAIN_TIMEOUT, task).await {
        Ok(Ok(Ok(buf))) => buf,
        Ok(Ok(Err(e))) => {
            warn!("Failed to read process output: {}", e);
            Vec::new()
        }
        Ok(Err(e)) => {
            warn!("Output reader failed: {}", e);
            Vec::new()
        }
        Err(_) => {
            warn!("Output still open {:?} after exit, dropping it", PIPE_DRAIN_TIMEOUT);
            Vec::new()
        }
    }
}

/// Kill the child and reap it
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!("Failed to kill timed out process: {}", e);
    }
}

/// Failure output as shown to the caller: stderr first, then stdout
fn diagnostic_output(stdout: &str, stderr: &str) -> String {
    let parts: Vec<&str> = [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        "no output".to_string()
    } else {
        parts.join("\n")
    }
}
