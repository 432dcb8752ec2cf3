//! Fan-out of one operation across a fixed set of connections.

use futures_util::future::try_join_all;

use crate::command_runner::{CommandRunner, ExecResult, RunOptions, TokioCommandRunner};
use crate::connection::{Connection, ConnectionOptions};
use crate::copy::CopyOptions;
use crate::error::Result;

/// Order-preserving aggregate: index *n* holds member *n*'s result.
pub type PoolResult = Vec<ExecResult>;

/// A fixed, ordered set of connections driven in lockstep.
///
/// Members are independent: each owns its endpoint, SSH argument set, and
/// sinks, so fan-out needs no shared state beyond the caller's sinks
/// (which must tolerate interleaved decorated lines).
pub struct ConnectionPool<R = TokioCommandRunner> {
    connections: Vec<Connection<R>>,
}

impl ConnectionPool {
    /// Builds one connection per remote spec, all sharing `options`.
    ///
    /// # Errors
    ///
    /// Fails on the first spec that does not parse as `[user@]host[:port]`.
    pub fn new<I, S>(remotes: I, options: &ConnectionOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let connections = remotes
            .into_iter()
            .map(|spec| Connection::new(spec.as_ref(), options.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { connections })
    }
}

impl<R> ConnectionPool<R> {
    /// Wraps pre-built connections, preserving their order.
    #[must_use]
    pub fn from_connections(connections: Vec<Connection<R>>) -> Self {
        Self { connections }
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection<R>] {
        &self.connections
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl<R: CommandRunner> ConnectionPool<R> {
    /// Runs `command` on every member concurrently and returns the results
    /// in member order.
    ///
    /// # Errors
    ///
    /// The first member failure observed fails the aggregate. Remaining
    /// in-flight operations are abandoned, not killed: their processes run
    /// to completion on their own and their results are discarded.
    pub async fn run(&self, command: &str, options: &RunOptions) -> Result<PoolResult> {
        try_join_all(self.connections.iter().map(|conn| conn.run(command, options))).await
    }

    /// Copies `src` to `dest` on every member concurrently; same ordering
    /// and failure semantics as [`run`](Self::run).
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn copy(&self, src: &str, dest: &str, options: &CopyOptions) -> Result<PoolResult> {
        try_join_all(
            self.connections
                .iter()
                .map(|conn| conn.copy(src, dest, options)),
        )
        .await
    }
}
