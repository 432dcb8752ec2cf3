//! Single-process transfer through `rsync`.

use crate::copy::{CopyOptions, Side, format_excludes, is_remote_side};
use crate::endpoint::Endpoint;

/// Composes the full `rsync` command line.
///
/// The side that is remote under `options.direction` is decorated
/// `user@host:`; the cached SSH arguments travel through `-e` so the
/// transport matches what `run` would use (port, key, host-key policy).
pub(crate) fn rsync_command(
    src: &str,
    dest: &str,
    remote: &Endpoint,
    ssh_args: &[String],
    options: &CopyOptions,
) -> String {
    let rsh = if ssh_args.is_empty() {
        "ssh".to_string()
    } else {
        format!("ssh {}", ssh_args.join(" "))
    };

    let mut parts = vec!["rsync".to_string()];
    parts.extend(format_excludes(&options.ignores));
    parts.push("-az".to_string());
    parts.extend(options.rsync_args.iter().cloned());
    parts.push(format!("-e \"{rsh}\""));
    parts.push(qualify(src, Side::Source, remote, options));
    parts.push(qualify(dest, Side::Destination, remote, options));
    parts.join(" ")
}

fn qualify(path: &str, side: Side, remote: &Endpoint, options: &CopyOptions) -> String {
    if is_remote_side(options.direction, side) {
        format!("{remote}:{path}")
    } else {
        path.to_string()
    }
}
