//! In-memory fakes for the command-runner and transform-engine traits
//! (testing only).
//!
//! `FakeCommandRunner` satisfies [`CommandRunner`] with scripted responses
//! matched by command-line prefix; `RecordingEngine` satisfies
//! [`TransformEngine`] and records which batches it was asked to apply.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Batch, FileOutcome, Result};
use crate::exec::{CommandOutput, CommandRunner};
use crate::orchestrator::TransformEngine;

/// A successful output with the given stdout.
pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
        duration_ms: 1,
        timed_out: false,
    }
}

/// A failed output with the given exit code and stderr.
pub fn fail_output(exit_code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
        duration_ms: 1,
        timed_out: false,
    }
}

#[derive(Debug)]
struct Script {
    prefix: String,
    outputs: VecDeque<CommandOutput>,
}

/// Scripted command runner.
///
/// Responses are keyed by command-line prefix (first match wins, in
/// registration order) because real invocations embed generated ids,
/// such as the batch UUIDs in stash messages, that exact matching cannot
/// know up front. A call with no scripted response succeeds with empty
/// output.
#[derive(Debug, Default)]
pub struct FakeCommandRunner {
    scripts: Mutex<Vec<Script>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `output` for the next call whose rendered command line starts
    /// with `prefix`. Repeated calls with the same prefix queue in order.
    pub fn respond(&self, prefix: &str, output: CommandOutput) {
        let mut scripts = self.scripts.lock().unwrap();
        if let Some(script) = scripts.iter_mut().find(|s| s.prefix == prefix) {
            script.outputs.push_back(output);
        } else {
            scripts.push(Script {
                prefix: prefix.to_string(),
                outputs: VecDeque::from([output]),
            });
        }
    }

    /// Queue a success with the given stdout.
    pub fn respond_ok(&self, prefix: &str, stdout: &str) {
        self.respond(prefix, ok_output(stdout));
    }

    /// Queue an exit-1 failure with the given stderr.
    pub fn respond_fail(&self, prefix: &str, stderr: &str) {
        self.respond(prefix, fail_output(1, stderr));
    }

    /// Every command line this runner has seen, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn render(program: &str, args: &[&str]) -> String {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _cwd: &Path,
        _timeout_secs: Option<u64>,
    ) -> Result<CommandOutput> {
        let line = Self::render(program, args);
        self.calls.lock().unwrap().push(line.clone());
        let mut scripts = self.scripts.lock().unwrap();
        for script in scripts.iter_mut() {
            if line.starts_with(&script.prefix) {
                if let Some(output) = script.outputs.pop_front() {
                    return Ok(output);
                }
            }
        }
        Ok(ok_output(""))
    }
}

/// Transform engine that applies nothing and records everything.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    applied: Mutex<Vec<Uuid>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch ids in application order.
    pub fn applied(&self) -> Vec<Uuid> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransformEngine for RecordingEngine {
    async fn apply_batch(&self, batch: &Batch, _workspace: &Path) -> Result<Vec<FileOutcome>> {
        self.applied.lock().unwrap().push(batch.batch_id);
        Ok(batch
            .candidates
            .iter()
            .map(|c| FileOutcome {
                relative_path: c.relative_path.clone(),
                changes_applied: c.proposed_changes,
                succeeded: true,
            })
            .collect())
    }
}
