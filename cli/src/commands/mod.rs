//! Command implementations

pub mod copy;
pub mod run;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize as _;
use serde::Serialize;

use flotilla_pool::{
    ConnectionOptions, ConnectionPool, ExecResult, LogFn, StrictHostKeyChecking, sink,
};

use crate::output::OutputContext;

/// Connection flags shared by every subcommand.
#[derive(Args)]
pub struct TargetArgs {
    /// Remote host ([user@]host[:port]); repeat to fan out
    #[arg(short = 'H', long = "host", value_name = "REMOTE", required = true)]
    pub hosts: Vec<String>,

    /// Private key passed to ssh -i
    #[arg(short, long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Host-key verification policy
    #[arg(long, value_enum)]
    pub strict: Option<StrictHostKeyChecking>,
}

/// Wires shared flags and output state into connection configuration.
///
/// Live streaming and operation logging are dropped under `--quiet` and
/// `--json` so machine output stays clean.
pub(crate) fn connection_options(
    target: &TargetArgs,
    ctx: &OutputContext,
    json: bool,
    as_user: Option<String>,
) -> ConnectionOptions {
    let stream = !json && !ctx.quiet;
    let dim = ctx.styles.dim;
    ConnectionOptions {
        key: target.key.clone(),
        strict: target.strict,
        as_user,
        stdout: stream.then(|| sink(std::io::stdout())),
        stderr: stream.then(|| sink(std::io::stderr())),
        log: stream.then(|| {
            let log: LogFn = Arc::new(move |line: &str| println!("{}", line.style(dim)));
            log
        }),
    }
}

#[derive(Serialize)]
struct HostReport<'a> {
    host: String,
    #[serde(flatten)]
    result: &'a ExecResult,
}

/// Prints the aggregate outcome: a JSON array keyed by host, or a short
/// success line when live output already went to the terminal.
pub(crate) fn report<R>(
    ctx: &OutputContext,
    pool: &ConnectionPool<R>,
    results: &[ExecResult],
    json: bool,
) -> Result<()> {
    if json {
        let payload: Vec<HostReport<'_>> = pool
            .connections()
            .iter()
            .zip(results)
            .map(|(conn, result)| HostReport {
                host: conn.remote().to_string(),
                result,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        ctx.success(&format!("Completed on {} host(s)", results.len()));
    }
    Ok(())
}
