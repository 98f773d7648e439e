//! Helpers for running a subject process with piped stdin/stdout.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// How long to keep draining stdout after a timed-out subject is killed.
///
/// Processes the subject started itself survive the kill and may hold the
/// pipe open; their output is abandoned once this elapses.
pub const KILL_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Limits applied to a single subject invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessLimits {
    /// Kill the child after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum stdout bytes kept in memory.
    pub output_limit_bytes: usize,
}

/// Captured subject output.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stdout_truncated: usize,
    pub timed_out: bool,
}

/// Owns a spawned child and guarantees it is killed and reaped on drop.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    /// Wait for exit, killing the child if `timeout` elapses first.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<(ExitStatus, bool)> {
        let Some(timeout) = timeout else {
            let status = self.child.wait().context("wait for subject")?;
            self.reaped = true;
            return Ok((status, false));
        };

        match self
            .child
            .wait_timeout(timeout)
            .context("wait for subject")?
        {
            Some(status) => {
                self.reaped = true;
                Ok((status, false))
            }
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "subject timed out, killing"
                );
                self.child.kill().context("kill subject")?;
                let status = self.child.wait().context("wait subject after kill")?;
                self.reaped = true;
                Ok((status, true))
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if self.child.try_wait().ok().flatten().is_none() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// Spawn `cmd`, deliver `input` on stdin, close it, and drain stdout to EOF.
///
/// Input is written and output is read on separate threads so a subject that
/// interleaves reading and writing cannot deadlock against full pipe buffers.
/// stderr is inherited.
#[instrument(skip_all, fields(input_len = input.len(), output_limit_bytes = limits.output_limit_bytes))]
pub fn run_with_input(
    mut cmd: Command,
    input: Vec<u8>,
    limits: ProcessLimits,
) -> Result<CapturedOutput> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    debug!("spawning subject");
    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn subject");
            return Err(e).context("spawn subject");
        }
    };
    let mut guard = ChildGuard::new(child);

    let stdin = guard
        .child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("stdin was not piped"))?;
    let stdout = guard
        .child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;

    let limit = limits.output_limit_bytes;
    let (stdout_tx, stdout_rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = stdout_tx.send(read_stream_limited(stdout, limit));
    });
    let stdin_handle = thread::spawn(move || write_input(stdin, &input));

    let (status, timed_out) = guard.wait(limits.timeout)?;

    let (stdout, stdout_truncated) = if timed_out {
        // The stdin writer is left detached; it ends when the last reader of the pipe exits.
        match stdout_rx.recv_timeout(KILL_DRAIN_GRACE) {
            Ok(result) => result.context("drain stdout after kill")?,
            Err(RecvTimeoutError::Timeout) => {
                warn!("stdout still held open after kill, abandoning capture");
                (Vec::new(), 0)
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(anyhow!("stdout reader thread panicked"));
            }
        }
    } else {
        join_thread(stdin_handle).context("join stdin writer")?;
        stdout_rx
            .recv()
            .map_err(|_| anyhow!("stdout reader thread panicked"))?
            .context("join stdout")?
    };

    if stdout_truncated > 0 {
        warn!(stdout_truncated, "subject output truncated");
    }

    debug!(
        exit_code = ?status.code(),
        timed_out,
        stdout_len = stdout.len(),
        "subject finished"
    );
    Ok(CapturedOutput {
        status,
        stdout,
        stdout_truncated,
        timed_out,
    })
}

/// Write all of `input`, then drop the handle to signal end-of-input.
///
/// A subject that exits without consuming its input closes the pipe early; that
/// is reported through its output, not as a harness error.
fn write_input(mut stdin: ChildStdin, input: &[u8]) -> Result<()> {
    match stdin.write_all(input).and_then(|()| stdin.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("subject closed stdin before reading all input");
            Ok(())
        }
        Err(e) => Err(e).context("write stdin"),
    }
}

fn join_thread<T>(handle: thread::JoinHandle<Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("subject I/O thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("read output"),
        };
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
