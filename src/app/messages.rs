//! Runner message handling for the application

use regex::Regex;
use std::sync::LazyLock;

use super::App;
use crate::constants::OUTPUT_BUFFER_BYTES;
use crate::runner::{RunOutcome, RunnerMessage, SessionId};

/// Regex to match ANSI escape codes.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Strip ANSI escape codes from a string
fn strip_ansi_codes(s: &str) -> String {
    ANSI_RE.replace_all(s, "").to_string()
}

impl App {
    /// Handle messages from running commands. Chunks and exits are
    /// demultiplexed onto the session that started the run; messages for a
    /// session that was collapsed in the meantime are dropped.
    pub fn handle_runner_message(&mut self, msg: RunnerMessage) {
        match msg {
            RunnerMessage::Chunk { session, text } => {
                self.append_chunk(session, &text);
            }
            RunnerMessage::Exit { session, outcome } => {
                self.finish_session(session, outcome);
            }
        }
    }

    fn append_chunk(&mut self, session_id: SessionId, text: &str) {
        let Some(session) = self
            .sessions
            .values_mut()
            .find(|s| s.session == session_id)
        else {
            return;
        };
        // A killed session stops accepting output immediately, even though
        // the pipes may still drain a few chunks; the same applies to
        // stragglers from orphaned grandchildren after the exit notice
        if session.cancelled || !session.running {
            return;
        }

        session.output.push_str(&strip_ansi_codes(text));

        // Keep the buffer bounded; trim whole leading chars
        if session.output.len() > OUTPUT_BUFFER_BYTES {
            let mut cut = session.output.len() - OUTPUT_BUFFER_BYTES;
            while !session.output.is_char_boundary(cut) {
                cut += 1;
            }
            session.output.drain(..cut);
        }
    }

    fn finish_session(&mut self, session_id: SessionId, outcome: RunOutcome) {
        let Some(session) = self
            .sessions
            .values_mut()
            .find(|s| s.session == session_id)
        else {
            return;
        };

        session.running = false;
        session.handle = None;
        // A spawn failure produced no chunks; its description is the output,
        // and it is also worth the banner (unlike a plain non-zero exit)
        let failure = if let RunOutcome::Failed { error } = &outcome {
            session.output = error.clone();
            Some(error.clone())
        } else {
            None
        };
        session.outcome = Some(outcome);

        if let Some(error) = failure {
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::RunSession;
    use crate::runner::spawn_run;
    use crate::store::CommandStore;
    use tokio::sync::mpsc;

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let store = CommandStore::open(dir.path()).unwrap();
        (dir, App::new(store))
    }

    fn fake_session(app: &mut App, command_id: i64, session: SessionId) {
        // A handle pointed at a finished child works fine as a stand-in
        let (tx, _rx) = mpsc::channel(1);
        let handle = spawn_run(tx, session, "sh", "true");
        app.sessions
            .insert(command_id, RunSession::new(session, handle));
    }

    #[tokio::test]
    async fn chunks_accumulate_in_append_order() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);

        app.handle_runner_message(RunnerMessage::Chunk {
            session: 10,
            text: "hel".to_string(),
        });
        app.handle_runner_message(RunnerMessage::Chunk {
            session: 10,
            text: "lo\n".to_string(),
        });

        assert_eq!(app.sessions[&1].output, "hello\n");
    }

    #[tokio::test]
    async fn ansi_codes_are_stripped() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);

        app.handle_runner_message(RunnerMessage::Chunk {
            session: 10,
            text: "\x1b[31mred\x1b[0m\n".to_string(),
        });
        assert_eq!(app.sessions[&1].output, "red\n");
    }

    #[tokio::test]
    async fn exit_marks_the_session_finished() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);

        app.handle_runner_message(RunnerMessage::Exit {
            session: 10,
            outcome: RunOutcome::Exited { code: Some(2) },
        });

        let session = &app.sessions[&1];
        assert!(!session.running);
        assert_eq!(session.outcome, Some(RunOutcome::Exited { code: Some(2) }));
        assert_eq!(session.status_label().as_deref(), Some("exit 2"));
    }

    #[tokio::test]
    async fn spawn_failures_fill_the_output_and_the_banner() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);

        app.handle_runner_message(RunnerMessage::Exit {
            session: 10,
            outcome: RunOutcome::Failed {
                error: "Failed to run /bin/zsh: not found".to_string(),
            },
        });

        assert_eq!(app.sessions[&1].output, "Failed to run /bin/zsh: not found");
        assert_eq!(
            app.error.as_deref(),
            Some("Failed to run /bin/zsh: not found")
        );
        assert!(!app.sessions[&1].running);
    }

    #[tokio::test]
    async fn cancelled_sessions_drop_trailing_chunks() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);
        app.cancel_run(1);

        app.handle_runner_message(RunnerMessage::Chunk {
            session: 10,
            text: "late output".to_string(),
        });
        assert!(app.sessions[&1].output.is_empty());
    }

    #[tokio::test]
    async fn messages_for_collapsed_sessions_are_ignored() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);
        app.drop_session(1);

        // Neither of these should panic or resurrect the session
        app.handle_runner_message(RunnerMessage::Chunk {
            session: 10,
            text: "ghost".to_string(),
        });
        app.handle_runner_message(RunnerMessage::Exit {
            session: 10,
            outcome: RunOutcome::Killed,
        });
        assert!(app.sessions.is_empty());
    }

    #[tokio::test]
    async fn output_buffer_is_bounded() {
        let (_dir, mut app) = test_app();
        fake_session(&mut app, 1, 10);

        let big = "x".repeat(OUTPUT_BUFFER_BYTES / 2 + 1);
        for _ in 0..3 {
            app.handle_runner_message(RunnerMessage::Chunk {
                session: 10,
                text: big.clone(),
            });
        }
        assert!(app.sessions[&1].output.len() <= OUTPUT_BUFFER_BYTES);
    }
}
