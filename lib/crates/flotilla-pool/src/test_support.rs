//! Test doubles shared across the unit tests.

#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::command_runner::{CommandRunner, ExecResult, RunOptions};
use crate::error::Result;
use crate::prefix::LinePrefixer;

/// One recorded `run_shell` invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Call {
    pub line: String,
    pub max_buffer: usize,
}

/// Scriptable [`CommandRunner`] that records command lines instead of
/// spawning processes. Clones share state, so tests keep a handle while the
/// connection owns another.
#[derive(Clone)]
pub(crate) struct FakeRunner {
    rsync_available: Arc<AtomicBool>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<Call>>>,
    script: Arc<Mutex<VecDeque<Result<ExecResult>>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            rsync_available: Arc::new(AtomicBool::new(true)),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn without_rsync() -> Self {
        let runner = Self::new();
        runner.set_rsync_available(false);
        runner
    }

    /// Adds per-call latency, for exercising completion-order behavior.
    pub fn with_delay(ms: u64) -> Self {
        Self {
            delay: Some(Duration::from_millis(ms)),
            ..Self::new()
        }
    }

    pub fn set_rsync_available(&self, available: bool) {
        self.rsync_available.store(available, Ordering::SeqCst);
    }

    /// Queues the outcome of an upcoming call. Once the queue is drained,
    /// calls succeed with empty output.
    pub fn push_result(&self, result: Result<ExecResult>) {
        self.script.lock().expect("script lock").push_back(result);
    }

    pub fn push_ok(&self, stdout: &str) {
        self.push_result(Ok(ExecResult {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.line).collect()
    }
}

impl CommandRunner for FakeRunner {
    async fn run_shell(
        &self,
        command: &str,
        options: &RunOptions,
        stdout_tee: Option<LinePrefixer>,
        stderr_tee: Option<LinePrefixer>,
    ) -> Result<ExecResult> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().expect("calls lock").push(Call {
            line: command.to_string(),
            max_buffer: options.max_buffer,
        });
        let scripted = self.script.lock().expect("script lock").pop_front();
        let result = match scripted {
            Some(outcome) => outcome?,
            None => ExecResult::default(),
        };
        if let Some(mut tee) = stdout_tee {
            tee.push(result.stdout.as_bytes());
            tee.finish();
        }
        if let Some(mut tee) = stderr_tee {
            tee.push(result.stderr.as_bytes());
            tee.finish();
        }
        Ok(result)
    }

    async fn binary_available(&self, name: &str) -> bool {
        if name == "rsync" {
            self.rsync_available.load(Ordering::SeqCst)
        } else {
            true
        }
    }
}
