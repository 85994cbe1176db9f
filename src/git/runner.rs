//! Version-control command runner.
//!
//! Ingestion talks to git only through [`VersionControlRunner`], so tests can
//! script command output and failures without a real repository.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// Outcome of a command whose failure is an expected, recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The command succeeded with non-blank output.
    Output(String),
    /// The command succeeded but printed nothing.
    Empty,
    /// The command failed; the reason is kept for placeholder text and logs.
    Failed(String),
}

impl Probe {
    pub fn output(&self) -> Option<&str> {
        match self {
            Probe::Output(text) => Some(text),
            _ => None,
        }
    }
}

/// Executes git subcommands and returns their stdout.
#[async_trait]
pub trait VersionControlRunner: Send + Sync {
    /// Run `git <args>`, failing on a non-zero exit.
    async fn run(&self, args: &[&str]) -> Result<String, GitError>;
}

/// Convenience wrappers over [`VersionControlRunner::run`].
#[async_trait]
pub trait RunnerExt {
    /// Run and return an empty string on failure.
    async fn run_safe(&self, args: &[&str]) -> String;

    /// Run and return `None` on failure.
    async fn run_or_null(&self, args: &[&str]) -> Option<String>;

    /// Run and classify the result as output, empty, or failed.
    async fn probe(&self, args: &[&str]) -> Probe;
}

#[async_trait]
impl<R: VersionControlRunner + ?Sized> RunnerExt for R {
    async fn run_safe(&self, args: &[&str]) -> String {
        self.run(args).await.unwrap_or_default()
    }

    async fn run_or_null(&self, args: &[&str]) -> Option<String> {
        self.run(args).await.ok()
    }

    async fn probe(&self, args: &[&str]) -> Probe {
        match self.run(args).await {
            Ok(text) if text.trim().is_empty() => Probe::Empty,
            Ok(text) => Probe::Output(text),
            Err(e) => {
                debug!(command = %args.join(" "), error = %e, "git probe failed");
                Probe::Failed(e.to_string())
            }
        }
    }
}

/// Runner that shells out to the system `git` binary in a fixed directory.
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

#[async_trait]
impl VersionControlRunner for GitCli {
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(GitError::SpawnFailed)?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
