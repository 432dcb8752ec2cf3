//! Typed errors for the pool engine.
//!
//! All variants implement `thiserror::Error`; callers that don't need to
//! branch on the variant can bubble them into `anyhow::Error` with `?`.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while running or copying.
///
/// Construction-time problems (`InvalidRemote`, `InvalidPath`) surface
/// before any process is spawned. The remaining variants describe the fate
/// of a single external process; a pool operation fails with the first
/// member error it observes, propagated unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote specifier did not match `[user@]host[:port]`.
    #[error("\"{0}\" is not a valid remote (expected [user@]host[:port])")]
    InvalidRemote(String),

    /// A source path with no final component (e.g. `/`) cannot name the
    /// temporary archive used by the staged copy strategy.
    #[error("cannot derive an archive name from {0:?}")]
    InvalidPath(String),

    /// The local shell could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process ran but exited non-zero. Captured output is carried so
    /// callers without live sinks can still inspect what happened.
    #[error("`{command}` exited with code {code}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// One output stream grew past the configured cap. The child is killed;
    /// output is never silently truncated.
    #[error("output of `{command}` exceeded the maximum buffer size of {limit} bytes")]
    MaxBufferExceeded { command: String, limit: usize },

    /// The executor-enforced time limit elapsed before the process exited.
    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    /// Reading from or waiting on a child process failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
