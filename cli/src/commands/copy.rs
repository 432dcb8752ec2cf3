//! Copy command: one transfer fanned out across hosts.

use anyhow::Result;
use clap::Args;

use flotilla_pool::{ConnectionPool, CopyOptions, DEFAULT_MAX_BUFFER, Direction};

use crate::commands::{TargetArgs, connection_options, report};
use crate::output::OutputContext;

/// Arguments for the copy command.
#[derive(Args)]
pub struct CopyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Source path
    pub src: String,

    /// Destination path
    pub dest: String,

    /// Transfer direction
    #[arg(long, value_enum, default_value = "local-to-remote")]
    pub direction: Direction,

    /// Pattern to skip; repeatable
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub excludes: Vec<String>,

    /// Extra argument passed through to rsync; repeatable
    #[arg(long = "rsync-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub rsync_args: Vec<String>,

    /// Stage through tar and scp even when rsync is available
    #[arg(long)]
    pub use_shim: bool,

    /// Per-stream output cap in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER)]
    pub max_buffer: usize,
}

/// Entry point for `flotilla copy`.
///
/// # Errors
///
/// Returns an error if a host spec does not parse or any transfer step
/// fails on any host.
pub async fn run(ctx: &OutputContext, args: &CopyArgs, json: bool) -> Result<()> {
    let options = connection_options(&args.target, ctx, json, None);
    let pool = ConnectionPool::new(&args.target.hosts, &options)?;
    let copy_options = CopyOptions {
        direction: args.direction,
        ignores: args.excludes.clone(),
        rsync_args: args.rsync_args.clone(),
        use_shim: args.use_shim,
        max_buffer: args.max_buffer,
    };
    let results = pool.copy(&args.src, &args.dest, &copy_options).await?;
    report(ctx, &pool, &results, json)
}
