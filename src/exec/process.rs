// src/exec/process.rs

//! Child process execution for [`ProcessRunner`](super::ProcessRunner).

use std::io::Write;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::ExecutionError;
use crate::run::{CommandSpec, ExecutionEnvironment};
use crate::types::OutputMode;

use super::backend::CommandOutput;

#[derive(Debug, Clone, Copy)]
enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    fn label(self) -> &'static str {
        match self {
            OutputStream::Stdout => "stdout",
            OutputStream::Stderr => "stderr",
        }
    }

    /// Echo a line to the matching stream of this process.
    fn echo(self, line: &str) {
        let res = match self {
            OutputStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(line.as_bytes()).and_then(|_| out.flush())
            }
            OutputStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(line.as_bytes()).and_then(|_| err.flush())
            }
        };
        if let Err(e) = res {
            debug!(stream = self.label(), error = %e, "failed to echo child output");
        }
    }
}

/// Run `spec` in `env` to completion.
///
/// The command is spawned directly (no shell). Both pipes are drained
/// concurrently with waiting on the child so neither can fill up and stall
/// it. In verbose mode every line is echoed as it arrives.
pub async fn run_process(
    spec: &CommandSpec,
    env: &ExecutionEnvironment,
    mode: OutputMode,
) -> Result<CommandOutput, ExecutionError> {
    let command_line = spec.display_line();

    debug!(
        cmd = %command_line,
        cwd = ?env.working_directory(),
        %mode,
        "spawning process"
    );

    let mut cmd = Command::new(spec.name());
    cmd.args(spec.arguments())
        .current_dir(env.working_directory())
        .envs(env.variables())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecutionError::Spawn {
        command: command_line.clone(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        drain(stdout, OutputStream::Stdout, mode),
        drain(stderr, OutputStream::Stderr, mode),
    );

    let status = status.map_err(|source| ExecutionError::Wait {
        command: command_line.clone(),
        source,
    })?;

    info!(
        cmd = %command_line,
        exit_code = ?status.code(),
        success = status.success(),
        "process exited"
    );

    if !status.success() {
        if !stderr.is_empty() {
            debug!(stderr = %stderr, "command stderr");
        }
        return Err(ExecutionError::Failed {
            command: command_line,
            code: status.code(),
            stderr,
        });
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: status.code().unwrap_or(0),
    })
}

/// Read a child pipe to the end, returning everything it produced.
///
/// Read errors end the capture early; they are logged rather than failing
/// the run, since the exit status is what decides success.
async fn drain<R>(reader: Option<R>, stream: OutputStream, mode: OutputMode) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if mode.is_verbose() {
                    stream.echo(&line);
                }
                captured.push_str(&line);
            }
            Err(e) => {
                warn!(stream = stream.label(), error = %e, "error reading child output");
                break;
            }
        }
    }

    captured
}
