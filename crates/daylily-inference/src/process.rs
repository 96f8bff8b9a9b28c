use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Runs `command` to completion, killing it if `timeout` elapses first.
///
/// Errors are returned as plain messages; callers wrap them in the error
/// variant for their engine.
pub(crate) async fn run(
    mut command: Command,
    timeout: Duration,
    name: &str,
) -> Result<Output, String> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(|e| format!("failed to spawn {}: {}", name, e))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| format!("{} timed out after {} seconds", name, timeout.as_secs()))?
        .map_err(|e| format!("failed to wait for {}: {}", name, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed ({}): {}", name, output.status, stderr.trim()));
    }

    Ok(output)
}

/// Whether `binary` names an executable that exists.
///
/// Bare names (no directory component) are looked up on `PATH`.
pub(crate) fn binary_available(binary: &Path) -> bool {
    if binary.as_os_str().is_empty() {
        return false;
    }
    if binary.components().count() > 1 || binary.is_absolute() {
        return binary.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths)
                .map(|dir: PathBuf| dir.join(binary))
                .any(|candidate| candidate.is_file())
        })
        .unwrap_or(false)
}

/// Seconds elapsed since `start`, rounded to two decimals.
pub(crate) fn latency_since(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

/// Creates an empty temporary file with the given extension and returns its
/// path. The file is removed when the returned value is dropped.
pub(crate) fn temp_path(extension: &str) -> std::io::Result<tempfile::TempPath> {
    tempfile::Builder::new()
        .prefix("daylily-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map(|file| file.into_temp_path())
}
