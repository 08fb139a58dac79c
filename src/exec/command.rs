// src/exec/command.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::errors::StageError;

/// Build a shell command appropriate for the platform.
fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd` as a text filter: `input` is written to its stdin, its stdout is
/// returned. A non-zero exit becomes a [`StageError::Tool`] carrying the
/// captured stderr.
pub async fn run_filter(cmd: &str, input: &str) -> Result<String> {
    debug!(cmd = %cmd, bytes = input.len(), "running filter command");

    let mut command = shell(cmd);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning filter command `{cmd}`"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .await
            .with_context(|| format!("writing stdin of `{cmd}`"))?;
        // Dropping stdin closes the pipe so the filter sees EOF.
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for filter command `{cmd}`"))?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(StageError::Tool {
            cmd: cmd.to_string(),
            code,
            stderr,
        }
        .into());
    }

    let stdout = String::from_utf8(output.stdout)
        .with_context(|| format!("filter command `{cmd}` produced non-UTF-8 output"))?;
    Ok(stdout)
}

/// Run `cmd` as an opaque collaborator: no stdin, stdout/stderr streamed at
/// debug level, success judged by exit status alone.
pub async fn run_hook(cmd: &str) -> Result<()> {
    debug!(cmd = %cmd, "running collaborator command");

    let mut command = shell(cmd);
    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning collaborator `{cmd}`"))?;

    if let Some(stdout) = child.stdout.take() {
        let cmd = cmd.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd, "stdout: {line}");
            }
        });
    }

    let mut stderr_tail = String::new();
    if let Some(stderr) = child.stderr.take() {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(cmd = %cmd, "stderr: {line}");
            stderr_tail = line;
        }
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for collaborator `{cmd}`"))?;

    if !status.success() {
        return Err(StageError::Tool {
            cmd: cmd.to_string(),
            code: status.code().unwrap_or(-1),
            stderr: stderr_tail,
        }
        .into());
    }

    Ok(())
}
