//! External process execution with capped, teed output capture.
//!
//! The engine never talks SSH itself; every remote action becomes a command
//! line (`ssh …`, `rsync …`, `scp …`, `tar …`) handed to [`CommandRunner`].
//! The production implementation runs lines through `sh -c` with tokio;
//! tests substitute deterministic fakes through the same trait, including
//! the binary-availability probe (so transfer-strategy selection is fully
//! scriptable).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::prefix::LinePrefixer;

/// Default per-stream output cap in bytes (1000 × 1024).
pub const DEFAULT_MAX_BUFFER: usize = 1_024_000;

/// Per-call execution knobs, passed through to the executor untouched.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory for the spawned shell.
    pub cwd: Option<PathBuf>,
    /// Per-stream capture cap; exceeding it fails the call.
    pub max_buffer: usize,
    /// Executor-enforced time limit. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            max_buffer: DEFAULT_MAX_BUFFER,
            timeout: None,
        }
    }
}

/// Captured output of one finished process (or one staged sequence).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
}

/// Shell execution plus binary probing behind one injectable seam.
///
/// The production implementation uses tokio; test doubles return canned
/// results without spawning processes.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Runs a complete command line through the local shell, streaming each
    /// output line into the optional tees while buffering up to
    /// `options.max_buffer` bytes per stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the shell cannot start,
    /// [`Error::CommandFailed`] on non-zero exit,
    /// [`Error::MaxBufferExceeded`] when either stream outgrows the cap, and
    /// [`Error::TimedOut`] when `options.timeout` elapses first.
    async fn run_shell(
        &self,
        command: &str,
        options: &RunOptions,
        stdout_tee: Option<LinePrefixer>,
        stderr_tee: Option<LinePrefixer>,
    ) -> Result<ExecResult>;

    /// Whether `name` resolves on the local executable search path.
    ///
    /// Probed fresh on every call: availability can change over the life of
    /// a long-running process, so implementations must not cache.
    async fn binary_available(&self, name: &str) -> bool;
}

/// Production [`CommandRunner`] that spawns `sh -c <command>` via tokio.
///
/// Both output pipes are read concurrently with the child to avoid the
/// pipe-buffer deadlock (a child blocked writing a full pipe never exits).
/// The child is killed explicitly when a cap or timeout trips; it is *not*
/// killed when the caller drops the future, so abandoned pool members run
/// to completion on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run_shell(
        &self,
        command: &str,
        options: &RunOptions,
        stdout_tee: Option<LinePrefixer>,
        stderr_tee: Option<LinePrefixer>,
    ) -> Result<ExecResult> {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &options.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| Error::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let overflow = Arc::new(Notify::new());
        // wait() joins the pipe reads so the deadline bounds the whole run,
        // including a child that closed its stdio but kept running.
        let finished = async {
            tokio::join!(
                child.wait(),
                read_capped(stdout_pipe, options.max_buffer, stdout_tee, overflow.clone()),
                read_capped(stderr_pipe, options.max_buffer, stderr_tee, overflow.clone()),
            )
        };
        let deadline = async {
            match options.timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            (status, out_res, err_res) = finished => {
                let status = status?;
                let (Captured::Complete(out), Captured::Complete(err)) = (out_res?, err_res?) else {
                    return Err(Error::MaxBufferExceeded {
                        command: command.to_string(),
                        limit: options.max_buffer,
                    });
                };
                let stdout = String::from_utf8_lossy(&out).into_owned();
                let stderr = String::from_utf8_lossy(&err).into_owned();
                if !status.success() {
                    return Err(Error::CommandFailed {
                        command: command.to_string(),
                        code: status.code().unwrap_or(-1),
                        stdout,
                        stderr,
                    });
                }
                Ok(ExecResult { stdout, stderr })
            }
            () = overflow.notified() => {
                let _ = child.kill().await;
                Err(Error::MaxBufferExceeded {
                    command: command.to_string(),
                    limit: options.max_buffer,
                })
            }
            () = deadline => {
                let _ = child.kill().await;
                Err(Error::TimedOut {
                    command: command.to_string(),
                    timeout: options.timeout.unwrap_or_default(),
                })
            }
        }
    }

    async fn binary_available(&self, name: &str) -> bool {
        let name = name.to_string();
        tokio::task::spawn_blocking(move || which::which(name).is_ok())
            .await
            .unwrap_or(false)
    }
}

enum Captured {
    Complete(Vec<u8>),
    Overflowed,
}

/// Drains one child pipe, teeing each chunk, stopping once `cap` would be
/// exceeded. Signals `overflow` so the caller can kill the child; a reader
/// that merely stopped would leave the child blocked on a full pipe forever.
async fn read_capped<R>(
    pipe: Option<R>,
    cap: usize,
    mut tee: Option<LinePrefixer>,
    overflow: Arc<Notify>,
) -> std::io::Result<Captured>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(Captured::Complete(Vec::new()));
    };
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = pipe.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if captured.len() + n > cap {
            overflow.notify_one();
            return Ok(Captured::Overflowed);
        }
        captured.extend_from_slice(&buf[..n]);
        if let Some(tee) = tee.as_mut() {
            tee.push(&buf[..n]);
        }
    }
    if let Some(tee) = tee.as_mut() {
        tee.finish();
    }
    Ok(Captured::Complete(captured))
}
