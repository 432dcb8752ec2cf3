//! Run command: one command line fanned out across hosts.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use flotilla_pool::{ConnectionPool, DEFAULT_MAX_BUFFER, RunOptions};

use crate::commands::{TargetArgs, connection_options, report};
use crate::output::OutputContext;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Run the command as this remote user via sudo
    #[arg(long, value_name = "USER")]
    pub as_user: Option<String>,

    /// Per-stream output cap in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER)]
    pub max_buffer: usize,

    /// Give up on a host after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Command to run on every host
    #[arg(required = true, trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Entry point for `flotilla run`.
///
/// # Errors
///
/// Returns an error if a host spec does not parse or any remote command
/// fails, times out, or outgrows the output cap.
pub async fn run(ctx: &OutputContext, args: &RunArgs, json: bool) -> Result<()> {
    let options = connection_options(&args.target, ctx, json, args.as_user.clone());
    let pool = ConnectionPool::new(&args.target.hosts, &options)?;
    let run_options = RunOptions {
        max_buffer: args.max_buffer,
        timeout: args.timeout.map(Duration::from_secs),
        ..RunOptions::default()
    };
    let command = args.command.join(" ");
    let results = pool.run(&command, &run_options).await?;
    report(ctx, &pool, &results, json)
}
