//! Staged transfer: archive, ship, extract.
//!
//! The fallback when `rsync` is unavailable or the caller forces it. Six
//! ordered command lines emulate a recursive copy; each runs on the local
//! shell or is wrapped through `ssh`, depending on which side of the
//! transfer is remote. Steps run strictly in sequence and nothing rolls
//! back on failure, so an aborted copy can leave a partial destination
//! directory or a stray archive behind.

use crate::command::build_ssh_command;
use crate::copy::{CopyOptions, Direction, Side, format_excludes, is_remote_side};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};

/// Fixed suffix appended to `basename(src)` to name the temporary archive.
///
/// Deterministic naming keeps the steps reproducible, at a price: two
/// concurrent staged copies of sources sharing a basename against the same
/// host will collide.
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Builds the six staged command lines for one copy, in execution order.
///
/// Remote-side steps go through [`build_ssh_command`], so they pick up the
/// connection's run-as user like any other remote command. The `scp` hop
/// does not; it has no remote command line to wrap.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when no archive name can be derived from
/// `src` (the filesystem root, an empty string).
pub(crate) fn archive_steps(
    src: &str,
    dest: &str,
    remote: &Endpoint,
    ssh_args: &[String],
    key: Option<&str>,
    as_user: Option<&str>,
    options: &CopyOptions,
) -> Result<Vec<String>> {
    let base = basename(src)?;
    let archive = format!("{base}{ARCHIVE_SUFFIX}");
    let src_dir = dirname(src);
    let src_archive = join(src_dir, &archive);
    let dest_archive = join(dest, &archive);

    let excludes = format_excludes(&options.ignores);
    let tar_create = if excludes.is_empty() {
        format!("cd {src_dir} && tar -czf {archive} {base}")
    } else {
        format!(
            "cd {src_dir} && tar {} -czf {archive} {base}",
            excludes.join(" ")
        )
    };

    let on_side = |line: String, side: Side| {
        if is_remote_side(options.direction, side) {
            build_ssh_command(&line, remote, ssh_args, as_user)
        } else {
            line
        }
    };

    Ok(vec![
        on_side(tar_create, Side::Source),
        on_side(format!("mkdir -p {dest}"), Side::Destination),
        scp_command(&src_archive, &dest_archive, remote, key, options.direction),
        on_side(format!("rm {src_archive}"), Side::Source),
        on_side(
            format!("cd {dest} && tar --strip-components 1 -xzf {archive}"),
            Side::Destination,
        ),
        on_side(format!("rm {dest_archive}"), Side::Destination),
    ])
}

/// One `scp` moving the archive across; only port and key carry over from
/// the connection (scp spells the port flag `-P`).
fn scp_command(
    from: &str,
    to: &str,
    remote: &Endpoint,
    key: Option<&str>,
    direction: Direction,
) -> String {
    let mut parts = vec!["scp".to_string()];
    if let Some(port) = remote.port {
        parts.push("-P".to_string());
        parts.push(port.to_string());
    }
    if let Some(key) = key {
        parts.push("-i".to_string());
        parts.push(key.to_string());
    }
    match direction {
        Direction::LocalToRemote => {
            parts.push(from.to_string());
            parts.push(format!("{remote}:{to}"));
        }
        Direction::RemoteToLocal => {
            parts.push(format!("{remote}:{from}"));
            parts.push(to.to_string());
        }
    }
    parts.join(" ")
}

/// Final path component, trailing slashes ignored.
fn basename(path: &str) -> Result<&str> {
    let trimmed = path.trim_end_matches('/');
    let name = match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    };
    if name.is_empty() {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(name)
}

/// Everything before the final component; `"."` when there is none.
fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(pos) => &trimmed[..pos],
        None => ".",
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
