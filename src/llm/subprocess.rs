//! Spawning provider CLIs with a configurable timeout.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::ProviderError;

/// Executes a provider CLI. Mocked in adapter tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CliExecutor: Send + Sync {
    /// Whether the CLI binary can be found.
    fn is_installed(&self) -> bool;

    /// Run the CLI with `args` and return stdout.
    async fn execute(&self, args: &[String]) -> Result<String, ProviderError>;
}

/// Executor that spawns a real binary, with its timeout read from an env var.
pub struct SystemCli {
    program: &'static str,
    timeout_var: &'static str,
}

impl SystemCli {
    pub const fn new(program: &'static str, timeout_var: &'static str) -> Self {
        Self {
            program,
            timeout_var,
        }
    }
}

#[async_trait]
impl CliExecutor for SystemCli {
    fn is_installed(&self) -> bool {
        is_installed(self.program)
    }

    async fn execute(&self, args: &[String]) -> Result<String, ProviderError> {
        run_cli(self.program, args, timeout_from_env(self.timeout_var)).await
    }
}

/// Default timeout for provider subprocess execution (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Read a timeout in seconds from `var`, falling back to the default.
///
/// Logs a warning if the variable is set but not a non-negative integer.
pub fn timeout_from_env(var: &str) -> Duration {
    match env::var(var) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    var, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Whether `program` resolves on PATH.
pub fn is_installed(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Run `program args...`, returning stdout or a classified error.
pub async fn run_cli(
    program: &'static str,
    args: &[String],
    limit: Duration,
) -> Result<String, ProviderError> {
    if !is_installed(program) {
        return Err(ProviderError::NotInstalled(program));
    }

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(limit, cmd.output())
        .await
        .map_err(|_| ProviderError::Timeout(limit.as_secs()))?
        .map_err(ProviderError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ProviderError::from_exit(code, stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
