//! One SSH target and the operations against it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command::build_ssh_command;
use crate::command_runner::{CommandRunner, ExecResult, RunOptions, TokioCommandRunner};
use crate::copy::archive::archive_steps;
use crate::copy::rsync::rsync_command;
use crate::copy::CopyOptions;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::prefix::{LinePrefixer, OutputSink};

/// Callback invoked with one human-readable line per logical operation.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Value for ssh's `StrictHostKeyChecking` option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum StrictHostKeyChecking {
    Yes,
    No,
    AcceptNew,
    Ask,
}

impl fmt::Display for StrictHostKeyChecking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::AcceptNew => "accept-new",
            Self::Ask => "ask",
        };
        f.write_str(value)
    }
}

/// Construction-time configuration, immutable for the connection's life.
#[derive(Clone, Default)]
pub struct ConnectionOptions {
    /// Private key passed to `ssh -i` (and `scp -i` during staged copies).
    pub key: Option<PathBuf>,
    /// Host-key verification policy; unset leaves ssh's own default.
    pub strict: Option<StrictHostKeyChecking>,
    /// Run every command as this remote user via `sudo -u`.
    pub as_user: Option<String>,
    /// Live sink for child stdout, decorated `@<host> ` per line.
    pub stdout: Option<OutputSink>,
    /// Live sink for child stderr, decorated `@<host>-err ` per line.
    pub stderr: Option<OutputSink>,
    /// Operation logger.
    pub log: Option<LogFn>,
}

/// A single remote target.
///
/// Holds the parsed endpoint and the SSH argument set derived once at
/// construction; every `run` and `copy` reuses both. The runner is generic
/// so tests substitute a scripted fake for the process-spawning one.
pub struct Connection<R = TokioCommandRunner> {
    remote: Endpoint,
    ssh_args: Vec<String>,
    key: Option<String>,
    as_user: Option<String>,
    stdout: Option<OutputSink>,
    stderr: Option<OutputSink>,
    log: Option<LogFn>,
    runner: R,
}

impl Connection {
    /// Parses `remote` (`[user@]host[:port]`) and builds a connection using
    /// the process-spawning runner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRemote`](crate::Error::InvalidRemote) when
    /// `remote` does not parse.
    pub fn new(remote: &str, options: ConnectionOptions) -> Result<Self> {
        Ok(Self::with_runner(remote.parse()?, options, TokioCommandRunner))
    }

    /// Builds a connection from an already-resolved endpoint.
    #[must_use]
    pub fn from_endpoint(remote: Endpoint, options: ConnectionOptions) -> Self {
        Self::with_runner(remote, options, TokioCommandRunner)
    }
}

impl<R> Connection<R> {
    /// Builds a connection around an explicit runner.
    pub fn with_runner(remote: Endpoint, options: ConnectionOptions, runner: R) -> Self {
        let key = options.key.map(|path| path.display().to_string());
        let ssh_args = derive_ssh_args(&remote, key.as_deref(), options.strict);
        Self {
            remote,
            ssh_args,
            key,
            as_user: options.as_user,
            stdout: options.stdout,
            stderr: options.stderr,
            log: options.log,
            runner,
        }
    }

    #[must_use]
    pub fn remote(&self) -> &Endpoint {
        &self.remote
    }

    pub(crate) fn ssh_args(&self) -> &[String] {
        &self.ssh_args
    }
}

impl<R: CommandRunner> Connection<R> {
    /// Runs `command` on the remote host and returns its captured output.
    ///
    /// The command is wrapped per the connection's configuration (sudo TTY
    /// flag, cached SSH arguments, as-user rewrap) and executed through the
    /// local `ssh` client. Live output is decorated per line into the
    /// configured sinks while the full streams are buffered for the result.
    ///
    /// # Errors
    ///
    /// Fails when the process cannot spawn, exits non-zero, outgrows
    /// `options.max_buffer`, or outlives `options.timeout`.
    pub async fn run(&self, command: &str, options: &RunOptions) -> Result<ExecResult> {
        if let Some(log) = &self.log {
            log(&format!(
                "Running \"{command}\" on host \"{}\".",
                self.remote.host
            ));
        }
        let line = build_ssh_command(command, &self.remote, &self.ssh_args, self.as_user.as_deref());
        self.execute(&line, options).await
    }

    /// Copies `src` to `dest` (or back, per `options.direction`).
    ///
    /// Uses a single `rsync` process when the binary resolves locally and
    /// the caller has not forced the staged path; otherwise runs the staged
    /// tar/scp sequence, strictly in order, and returns the concatenation
    /// of every step's output. Availability is probed fresh on each call.
    /// Staged steps that execute remotely are wrapped like `run` commands,
    /// the run-as user included; rsync has no remote command line to wrap.
    ///
    /// # Errors
    ///
    /// The first failing process fails the whole copy. Staged steps already
    /// completed are not rolled back, so a failed copy can leave a partial
    /// destination directory or a stray `.tar.gz` behind.
    pub async fn copy(&self, src: &str, dest: &str, options: &CopyOptions) -> Result<ExecResult> {
        let rsync = !options.use_shim && self.runner.binary_available("rsync").await;
        let run_options = RunOptions {
            max_buffer: options.max_buffer,
            ..RunOptions::default()
        };
        if rsync {
            if let Some(log) = &self.log {
                log(&format!("Copying \"{src}\" to \"{dest}\" via rsync."));
            }
            let line = rsync_command(src, dest, &self.remote, &self.ssh_args, options);
            return self.execute(&line, &run_options).await;
        }

        if let Some(log) = &self.log {
            log(&format!("Copying \"{src}\" to \"{dest}\" via staged archive."));
        }
        let steps = archive_steps(
            src,
            dest,
            &self.remote,
            &self.ssh_args,
            self.key.as_deref(),
            self.as_user.as_deref(),
            options,
        )?;
        let mut aggregate = ExecResult::default();
        for step in steps {
            let result = self.execute(&step, &run_options).await?;
            aggregate.stdout.push_str(&result.stdout);
            aggregate.stderr.push_str(&result.stderr);
        }
        Ok(aggregate)
    }

    async fn execute(&self, line: &str, options: &RunOptions) -> Result<ExecResult> {
        let stdout_tee = self
            .stdout
            .as_ref()
            .map(|sink| LinePrefixer::new(format!("@{} ", self.remote.host), sink.clone()));
        let stderr_tee = self
            .stderr
            .as_ref()
            .map(|sink| LinePrefixer::new(format!("@{}-err ", self.remote.host), sink.clone()));
        self.runner.run_shell(line, options, stdout_tee, stderr_tee).await
    }
}

/// Derives the cached SSH argument set: port, then key, then host-key
/// policy. Shared verbatim by `run` and by rsync's `-e` remote shell.
fn derive_ssh_args(
    remote: &Endpoint,
    key: Option<&str>,
    strict: Option<StrictHostKeyChecking>,
) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(port) = remote.port {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    if let Some(key) = key {
        args.push("-i".to_string());
        args.push(key.to_string());
    }
    if let Some(strict) = strict {
        args.push("-o".to_string());
        args.push(format!("StrictHostKeyChecking={strict}"));
    }
    args
}
