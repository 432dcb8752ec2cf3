//! File transfer between the local machine and a remote endpoint.
//!
//! Two strategies produce the same result shape: a single `rsync` process
//! when the binary resolves locally, or a staged tar/scp pipeline when it
//! does not (or when the caller forces the staged path). Strategy selection
//! happens per call inside [`Connection::copy`](crate::Connection::copy).

pub(crate) mod archive;
pub(crate) mod rsync;

use crate::command_runner::DEFAULT_MAX_BUFFER;

/// Transfer direction, always phrased from the local machine's side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Direction {
    /// Local `src`, remote `dest`.
    #[default]
    LocalToRemote,
    /// Remote `src`, local `dest`.
    RemoteToLocal,
}

/// One end of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Source,
    Destination,
}

/// Which end of the transfer lives on the remote host.
pub(crate) fn is_remote_side(direction: Direction, side: Side) -> bool {
    matches!(
        (direction, side),
        (Direction::LocalToRemote, Side::Destination) | (Direction::RemoteToLocal, Side::Source)
    )
}

/// Per-copy knobs. `direction` is logical only and never reaches the
/// spawned process; everything else shapes the generated command lines.
#[derive(Clone, Debug)]
pub struct CopyOptions {
    pub direction: Direction,
    /// Patterns skipped during transfer, passed through verbatim.
    pub ignores: Vec<String>,
    /// Extra arguments spliced into the `rsync` invocation.
    pub rsync_args: Vec<String>,
    /// Force the staged tar/scp path even when `rsync` is available.
    pub use_shim: bool,
    /// Per-stream capture cap for every process this copy spawns.
    pub max_buffer: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            ignores: Vec::new(),
            rsync_args: Vec::new(),
            use_shim: false,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

/// Renders ignore patterns as `--exclude "<pattern>"` token pairs, order
/// preserved. Understood by both `rsync` and `tar`.
pub(crate) fn format_excludes(ignores: &[String]) -> Vec<String> {
    ignores
        .iter()
        .map(|pattern| format!("--exclude \"{pattern}\""))
        .collect()
}
