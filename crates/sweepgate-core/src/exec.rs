//! Command-runner capability: the single seam through which git and the
//! build tool are invoked, so tests substitute deterministic fakes instead
//! of spawning real processes.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::{CampaignError, Result};

/// Captured outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when unavailable (killed, timed out).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// Whether the wall-clock limit expired before the command finished.
    pub timed_out: bool,
}

impl CommandOutput {
    /// A zero exit within the time limit.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Narrow capability for running external commands.
///
/// An `Err` means the command could not be run at all (spawn failure);
/// a command that ran and failed is an `Ok` with a non-zero exit code,
/// and a command that outlived its limit is an `Ok` with `timed_out`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        timeout_secs: Option<u64>,
    ) -> Result<CommandOutput>;
}

/// Production runner backed by `tokio::process`.
///
/// Children are spawned with piped output and `kill_on_drop`, so a
/// timed-out command does not linger past its future.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        timeout_secs: Option<u64>,
    ) -> Result<CommandOutput> {
        let start = Instant::now();
        tracing::debug!(program = %program, args = ?args, cwd = %cwd.display(), "running command");

        let child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CampaignError::Command(format!("failed to spawn {program}: {e}")))?;

        let output = match timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(result) => result.map_err(|e| {
                        CampaignError::Command(format!("failed to wait for {program}: {e}"))
                    })?,
                    Err(_) => {
                        return Ok(CommandOutput {
                            exit_code: -1,
                            stdout: String::new(),
                            stderr: format!("{program} timed out after {secs}s"),
                            duration_ms: start.elapsed().as_millis() as u64,
                            timed_out: true,
                        });
                    }
                }
            }
            None => child.wait_with_output().await.map_err(|e| {
                CampaignError::Command(format!("failed to wait for {program}: {e}"))
            })?,
        };

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            timed_out: false,
        })
    }
}
