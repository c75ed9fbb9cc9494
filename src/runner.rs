//! Async shell command execution with output streaming
//!
//! Each run spawns `<shell> -c <command>` and forwards combined
//! stdout/stderr to the caller as it arrives, over an mpsc channel shared by
//! every session. Messages are tagged with the session id so concurrent runs
//! can be demultiplexed. Exactly one [`RunnerMessage::Exit`] follows the last
//! chunk of a run and carries the child's exit status.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Identifies one execution session; assigned by the caller, unique per run
pub type SessionId = u64;

/// Messages sent from a running command to the owning session
#[derive(Debug, Clone)]
pub enum RunnerMessage {
    /// A fragment of combined stdout/stderr, always valid text
    Chunk { session: SessionId, text: String },
    /// Terminal state; sent exactly once, after all output chunks
    Exit {
        session: SessionId,
        outcome: RunOutcome,
    },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Child exited; `code` is `None` when terminated by a signal
    Exited { code: Option<i32> },
    /// Child was killed through [`RunHandle::kill`]
    Killed,
    /// Child could not be spawned or awaited; no chunks were produced
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Exited { code: Some(0) })
    }
}

/// Cancellation handle for a running command
#[derive(Debug)]
pub struct RunHandle {
    kill_tx: Option<oneshot::Sender<()>>,
}

impl RunHandle {
    /// Terminate the child process. The session still receives its `Exit`
    /// message (with [`RunOutcome::Killed`]) once the child is reaped.
    pub fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Resolve a shell name from settings to an executable path.
///
/// Plain names resolve under `/bin`; anything containing a slash is taken
/// verbatim.
pub fn shell_path(shell: &str) -> String {
    if shell.contains('/') {
        shell.to_string()
    } else {
        format!("/bin/{shell}")
    }
}

/// Start `<shell> -c <command_line>` and stream its output to `tx`.
///
/// Returns immediately; all I/O happens on spawned tasks. The returned
/// handle only supports cancellation and may be dropped freely.
pub fn spawn_run(
    tx: mpsc::Sender<RunnerMessage>,
    session: SessionId,
    shell: &str,
    command_line: &str,
) -> RunHandle {
    let (kill_tx, kill_rx) = oneshot::channel();
    let shell_path = shell_path(shell);
    let command_line = command_line.to_string();

    tokio::spawn(run_session(tx, session, shell_path, command_line, kill_rx));

    RunHandle {
        kill_tx: Some(kill_tx),
    }
}

async fn run_session(
    tx: mpsc::Sender<RunnerMessage>,
    session: SessionId,
    shell_path: String,
    command_line: String,
    mut kill_rx: oneshot::Receiver<()>,
) {
    tracing::info!(session, shell = %shell_path, "running command");

    let mut child = match Command::new(&shell_path)
        .arg("-c")
        .arg(&command_line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            let _ = tx
                .send(RunnerMessage::Exit {
                    session,
                    outcome: RunOutcome::Failed {
                        error: format!("Failed to run {}: {}", shell_path, e),
                    },
                })
                .await;
            return;
        }
    };

    // Both pipes were requested above; a missing handle means the spawn is
    // unusable, so report it the same way as a spawn failure.
    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(out), Some(err)) => (out, err),
        _ => {
            let _ = child.start_kill();
            let _ = tx
                .send(RunnerMessage::Exit {
                    session,
                    outcome: RunOutcome::Failed {
                        error: format!("Failed to capture output of {}", shell_path),
                    },
                })
                .await;
            return;
        }
    };

    let stdout_task = tokio::spawn(stream_output(stdout, tx.clone(), session));
    let stderr_task = tokio::spawn(stream_output(stderr, tx.clone(), session));

    let outcome = tokio::select! {
        status = child.wait() => exit_outcome(status),
        res = &mut kill_rx => {
            if res.is_ok() {
                tracing::info!(session, "killing command");
                let _ = child.start_kill();
                let _ = child.wait().await;
                RunOutcome::Killed
            } else {
                // Handle was dropped without a kill; keep waiting normally
                exit_outcome(child.wait().await)
            }
        }
    };

    // Reader tasks end at pipe EOF, so joining them here guarantees every
    // buffered chunk is delivered before the exit notice. A killed run gets
    // no such guarantee: its readers are torn down immediately, and the
    // session suppresses stragglers anyway. The join timeout covers orphaned
    // grandchildren that inherited the pipes and keep them open.
    if outcome == RunOutcome::Killed {
        stdout_task.abort();
        stderr_task.abort();
    }
    for task in [stdout_task, stderr_task] {
        match tokio::time::timeout(Duration::from_secs(5), task).await {
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(session, "output reader still draining after exit");
            }
        }
    }

    tracing::info!(session, ?outcome, "command finished");
    let _ = tx.send(RunnerMessage::Exit { session, outcome }).await;
}

fn exit_outcome(status: std::io::Result<std::process::ExitStatus>) -> RunOutcome {
    match status {
        Ok(status) => RunOutcome::Exited {
            code: status.code(),
        },
        Err(e) => RunOutcome::Failed {
            error: format!("Failed to wait for command: {}", e),
        },
    }
}

/// Forward one pipe to the channel, chunk by chunk, until EOF.
async fn stream_output(
    mut reader: impl AsyncRead + Unpin,
    tx: mpsc::Sender<RunnerMessage>,
    session: SessionId,
) {
    let mut buf = [0u8; 4096];
    let mut decoder = Utf8Carry::default();

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.push(&buf[..n]);
                if text.is_empty() {
                    continue;
                }
                if tx
                    .send(RunnerMessage::Chunk { session, text })
                    .await
                    .is_err()
                {
                    // Receiver gone; nobody is watching this run anymore
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(session, "output read failed: {}", e);
                break;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        let _ = tx.send(RunnerMessage::Chunk { session, text: tail }).await;
    }
}

/// Incremental UTF-8 decoder that holds back a trailing incomplete sequence,
/// so reads that split a multi-byte character still yield valid text with no
/// replacement characters.
#[derive(Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let boundary = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // Incomplete sequence at the end: decode up to it, carry the rest
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            // Genuinely invalid bytes: decode everything, replacements included
            Err(_) => self.pending.len(),
        };

        let text = String::from_utf8_lossy(&self.pending[..boundary]).into_owned();
        self.pending.drain(..boundary);
        text
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drain the channel for one session until its Exit arrives.
    async fn collect_run(
        rx: &mut mpsc::Receiver<RunnerMessage>,
        session: SessionId,
    ) -> (String, RunOutcome) {
        let mut output = String::new();
        loop {
            match rx.recv().await.expect("runner channel closed early") {
                RunnerMessage::Chunk { session: s, text } if s == session => {
                    output.push_str(&text);
                }
                RunnerMessage::Exit {
                    session: s,
                    outcome,
                } if s == session => return (output, outcome),
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn echo_streams_output_and_exits_cleanly() {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_run(tx, 1, "sh", "echo hello");

        let (output, outcome) = collect_run(&mut rx, 1).await;
        assert_eq!(output, "hello\n");
        assert_eq!(outcome, RunOutcome::Exited { code: Some(0) });

        // Exit is the final message of the run
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stderr_is_merged_into_the_stream() {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_run(tx, 1, "sh", "echo out; echo err 1>&2");

        let (output, outcome) = collect_run(&mut rx, 1).await;
        assert!(output.contains("out\n"));
        assert!(output.contains("err\n"));
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn nonzero_exit_code_is_propagated() {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_run(tx, 1, "sh", "echo failing; exit 3");

        let (output, outcome) = collect_run(&mut rx, 1).await;
        assert_eq!(output, "failing\n");
        assert_eq!(outcome, RunOutcome::Exited { code: Some(3) });
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn missing_shell_reports_failure_without_chunks() {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_run(tx, 1, "/nonexistent/shell", "echo hi");

        let (output, outcome) = collect_run(&mut rx, 1).await;
        assert!(output.is_empty());
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn concurrent_sessions_do_not_interleave_buffers() {
        let (tx, mut rx) = mpsc::channel(64);
        spawn_run(tx.clone(), 1, "sh", "for i in 1 2 3; do echo one-$i; done");
        spawn_run(tx, 2, "sh", "for i in 1 2 3; do echo two-$i; done");

        let mut outputs = [String::new(), String::new()];
        let mut exits = 0;
        while exits < 2 {
            match rx.recv().await.expect("runner channel closed early") {
                RunnerMessage::Chunk { session, text } => {
                    outputs[(session - 1) as usize].push_str(&text);
                }
                RunnerMessage::Exit { outcome, .. } => {
                    assert!(outcome.is_success());
                    exits += 1;
                }
            }
        }

        assert_eq!(outputs[0], "one-1\none-2\none-3\n");
        assert_eq!(outputs[1], "two-1\ntwo-2\ntwo-3\n");
    }

    #[tokio::test]
    async fn kill_terminates_a_running_command() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut handle = spawn_run(tx, 1, "sh", "echo started; sleep 30");

        // Wait for the child to be alive before killing it
        match rx.recv().await {
            Some(RunnerMessage::Chunk { text, .. }) => assert_eq!(text, "started\n"),
            other => panic!("expected first chunk, got {:?}", other),
        }
        handle.kill();

        let (_, outcome) = collect_run(&mut rx, 1).await;
        assert_eq!(outcome, RunOutcome::Killed);
    }

    #[test]
    fn utf8_carry_reassembles_split_sequences() {
        let mut decoder = Utf8Carry::default();
        let bytes = "héllo→🦀".as_bytes();

        // Feed one byte at a time; every returned fragment must be clean
        let mut out = String::new();
        for b in bytes {
            let chunk = decoder.push(std::slice::from_ref(b));
            assert!(!chunk.contains('\u{FFFD}'));
            out.push_str(&chunk);
        }
        out.push_str(&decoder.finish());
        assert_eq!(out, "héllo→🦀");
    }

    #[test]
    fn utf8_carry_passes_invalid_bytes_through_lossily() {
        let mut decoder = Utf8Carry::default();
        let out = decoder.push(b"ok\xff\xfeok");
        assert!(out.starts_with("ok"));
        assert!(out.ends_with("ok"));
    }

    #[test]
    fn shell_names_resolve_under_bin() {
        assert_eq!(shell_path("zsh"), "/bin/zsh");
        assert_eq!(shell_path("/usr/local/bin/fish"), "/usr/local/bin/fish");
    }
}
