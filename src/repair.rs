//! Repair actions for failing applications
//!
//! Log append and restart spawn live here; mail notification is in `mail`.
//! Every action reports its own failures and never blocks the others.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Append one failure line to the application's log file, creating it if
/// needed.
pub fn append_failure_log(path: &Path, app_name: &str, now: &DateTime<Local>) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::LogAppend {
            path: path.to_path_buf(),
            source: e,
        })?;

    writeln!(
        file,
        "{} lookout detected a failure in '{}'",
        now.format("%Y-%m-%d %H:%M:%S"),
        app_name
    )
    .map_err(|e| Error::LogAppend {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Capability to spawn a restart command line
pub trait CommandSpawner {
    fn spawn(&self, command_line: &str) -> Result<()>;
}

/// Spawns `sh -c <command>` detached, fire-and-forget.
///
/// The child is never waited on; only spawn-time errors (missing shell,
/// resource exhaustion) surface to the caller.
pub struct ShellSpawner;

impl CommandSpawner for ShellSpawner {
    fn spawn(&self, command_line: &str) -> Result<()> {
        Command::new("sh")
            .args(["-c", command_line])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|e| Error::SpawnFailed {
                command: command_line.to_string(),
                source: e,
            })
    }
}
