//! Recorder child process management.
//!
//! The service does not talk to audio hardware itself; it spawns the
//! platform recorder and reads headerless little-endian s16 mono PCM from
//! its stdout. Only that stdout format is contractual.

use crate::error::VadError;
use std::process::Stdio;
use tokio::process::{Child, ChildStdout, Command};
use tracing::warn;

/// Spawn the recorder child, returning the handle and its captured stdout.
pub fn spawn(rate: u32) -> Result<(Child, ChildStdout), VadError> {
    let mut command = recorder_command(rate);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = command
        .spawn()
        .map_err(|e| VadError::MicUnavailable(e.to_string()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| VadError::MicUnavailable("recorder stdout not captured".to_string()))?;

    Ok((child, stdout))
}

#[cfg(target_os = "linux")]
fn recorder_command(rate: u32) -> Command {
    let mut command = Command::new("arecord");
    command
        .args(["-q", "-t", "raw", "-f", "S16_LE", "-c", "1"])
        .arg("-r")
        .arg(rate.to_string());
    command
}

#[cfg(not(target_os = "linux"))]
fn recorder_command(rate: u32) -> Command {
    let mut command = Command::new("sox");
    command
        .args(["-q", "-d", "-t", "raw", "-b", "16", "-e", "signed-integer", "-c", "1"])
        .arg("-r")
        .arg(rate.to_string())
        .arg("-");
    command
}

/// Terminate the recorder. Best effort: the pipeline observes end-of-stream
/// on the child's stdout either way.
pub async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        warn!("failed to signal recorder: {}", e);
    }
    if let Err(e) = child.wait().await {
        warn!("failed to reap recorder: {}", e);
    }
}
