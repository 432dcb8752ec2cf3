//! Remote command construction.
//!
//! Pure functions: the exact `ssh` invocation for a logical command is a
//! function of the command text, the connection's cached SSH arguments, and
//! the optional as-user override. No I/O happens here.

use crate::endpoint::Endpoint;

/// `sudo` as a leading token, not a mere prefix: `sudoedit …` is not a sudo
/// command.
pub(crate) fn is_sudo_command(command: &str) -> bool {
    command == "sudo" || command.starts_with("sudo ")
}

fn escape_double_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Renders the final quoted payload argument, applying the as-user rewrap.
///
/// With `as_user`, a leading `sudo` token is stripped before wrapping in
/// `sudo -u <user>` so the remote never sees nested sudo invocations.
pub(crate) fn format_raw_command(command: &str, as_user: Option<&str>) -> String {
    let payload = match as_user {
        Some(user) => {
            let stripped = if is_sudo_command(command) {
                command.strip_prefix("sudo").unwrap_or(command).trim_start()
            } else {
                command
            };
            format!("sudo -u {user} {stripped}")
        }
        None => command.to_string(),
    };
    format!("\"{}\"", escape_double_quotes(&payload))
}

/// Builds the complete `ssh` command line for one remote command.
///
/// Shape: `ssh [-tt] <cached args…> <user@host> "<escaped command>"`. The
/// TTY flag is derived from the *raw* command text (sudo may prompt and
/// needs a pseudo-terminal), before any as-user rewrap.
pub(crate) fn build_ssh_command(
    command: &str,
    remote: &Endpoint,
    ssh_args: &[String],
    as_user: Option<&str>,
) -> String {
    let mut parts: Vec<String> = vec!["ssh".to_string()];
    if is_sudo_command(command) {
        parts.push("-tt".to_string());
    }
    parts.extend(ssh_args.iter().cloned());
    parts.push(remote.to_string());
    parts.push(format_raw_command(command, as_user));
    parts.join(" ")
}
