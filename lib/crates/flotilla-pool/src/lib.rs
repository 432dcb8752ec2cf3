//! Run commands and copy files against one or many SSH hosts by driving
//! the local `ssh`, `rsync`, `scp`, and `tar` binaries.
//!
//! A [`Connection`] owns one parsed endpoint plus the SSH arguments derived
//! from its configuration; [`ConnectionPool`] fans the same operation out
//! across several connections concurrently, preserving member order.
//! Transfers go through `rsync` when it resolves locally and fall back to a
//! staged tar-over-scp sequence when it does not.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod command;

pub mod command_runner;
pub mod connection;
pub mod copy;
pub mod endpoint;
pub mod error;
pub mod pool;
pub mod prefix;

#[cfg(test)]
pub(crate) mod test_support;

pub use command_runner::{
    CommandRunner, DEFAULT_MAX_BUFFER, ExecResult, RunOptions, TokioCommandRunner,
};
pub use connection::{Connection, ConnectionOptions, LogFn, StrictHostKeyChecking};
pub use copy::{CopyOptions, Direction};
pub use endpoint::{DEFAULT_USER, Endpoint};
pub use error::{Error, Result};
pub use pool::{ConnectionPool, PoolResult};
pub use prefix::{LinePrefixer, OutputSink, sink};
