//! Remote endpoint parsing and formatting.
//!
//! An endpoint is `[user@]host[:port]`. The user defaults to `deploy` when
//! omitted; the port stays unset when omitted. Formatting renders
//! `user@host`; the port is always passed separately (`-p`/`-P`) and never
//! embedded in the formatted string.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// User assumed when the specifier has no `user@` segment.
pub const DEFAULT_USER: &str = "deploy";

static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:([^@:\s]+)@)?([^@:\s]+)(?::(\d+))?$").expect("valid regex")
});

/// A resolved remote target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub user: String,
    pub host: String,
    pub port: Option<u16>,
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Parses `[user@]host[:port]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRemote`] when `spec` is empty, does not match
    /// the grammar, or carries a port outside the 16-bit range.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let caps = REMOTE_RE
            .captures(spec)
            .ok_or_else(|| Error::InvalidRemote(spec.to_string()))?;

        let port = match caps.get(3) {
            Some(m) => Some(
                m.as_str()
                    .parse::<u16>()
                    .map_err(|_| Error::InvalidRemote(spec.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            user: caps
                .get(1)
                .map_or(DEFAULT_USER, |m| m.as_str())
                .to_string(),
            host: caps[2].to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}
