//! Application state management
//!
//! This module contains the core application state and is split into:
//! - `state.rs` - State type definitions (AppMode, CommandForm, RunSession)
//! - `handlers.rs` - Keyboard input handlers
//! - `messages.rs` - Runner message handling
//!
//! `App` is also the facade in front of storage: every fallible store call
//! goes through a wrapper here that records the failure in a single
//! clearable error slot and keeps the last good in-memory state, so the UI
//! never has to catch anything.

mod handlers;
mod messages;
pub mod state;

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::constants::SPINNER_TICK_MS;
use crate::runner::{self, RunnerMessage, SessionId};
use crate::store::{Command, CommandStore, Settings, StoreError};

// Re-export commonly used types
pub use state::{AppMode, CommandForm, FormField, RunSession};

/// Main application state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub show_exit_confirm: bool,
    pub spinner_state: usize,
    pub last_tick: Instant,
    /// Latest storage failure, shown as a banner until dismissed
    pub error: Option<String>,
    /// In-memory copy of the command table, refreshed after every mutation
    pub commands: Vec<Command>,
    pub settings: Settings,
    /// Live and finished runs, keyed by command id
    pub sessions: HashMap<i64, RunSession>,
    store: CommandStore,
    pub(crate) runner_tx: Option<mpsc::Sender<RunnerMessage>>,
    next_session: SessionId,
}

impl App {
    pub fn new(store: CommandStore) -> Self {
        let mut app = Self {
            mode: AppMode::list(),
            should_quit: false,
            show_exit_confirm: false,
            spinner_state: 0,
            last_tick: Instant::now(),
            error: None,
            commands: Vec::new(),
            settings: Settings::default(),
            sessions: HashMap::new(),
            store,
            runner_tx: None,
            next_session: 0,
        };
        app.reload_commands();
        app.load_settings();
        app
    }

    pub fn set_runner_sender(&mut self, tx: mpsc::Sender<RunnerMessage>) {
        self.runner_tx = Some(tx);
    }

    /// Called on each tick to update animations
    pub fn tick(&mut self) {
        if self.last_tick.elapsed().as_millis() >= SPINNER_TICK_MS {
            self.spinner_state = (self.spinner_state + 1) % 10;
            self.last_tick = Instant::now();
        }
    }

    /// The command under the cursor in list mode
    pub fn selected_command(&self) -> Option<&Command> {
        match self.mode {
            AppMode::List { selected, .. } => self.commands.get(selected),
            _ => None,
        }
    }

    // --- Storage facade ---------------------------------------------------

    fn record_error(&mut self, what: &str, err: StoreError) {
        tracing::error!("failed to {}: {}", what, err);
        self.error = Some(format!("Failed to {}: {}", what, err));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Refresh the in-memory command list; keeps the previous list on error.
    pub fn reload_commands(&mut self) {
        match self.store.list_commands() {
            Ok(commands) => self.commands = commands,
            Err(e) => self.record_error("load commands", e),
        }
    }

    pub fn load_settings(&mut self) {
        match self.store.settings() {
            Ok(settings) => self.settings = settings,
            Err(e) => self.record_error("load settings", e),
        }
    }

    pub fn add_command(&mut self, name: String, command: String) {
        if let Err(e) = self.store.insert_command(Command::new(name, command)) {
            self.record_error("save command", e);
        }
        self.reload_commands();
    }

    pub fn save_edit(&mut self, command: &Command) {
        if let Err(e) = self.store.update_command(command) {
            self.record_error("update command", e);
        }
        self.reload_commands();
    }

    pub fn delete_command(&mut self, id: i64) {
        // The row owns its session; deleting the row ends the session too
        self.drop_session(id);
        if let Err(e) = self.store.delete_command(id) {
            self.record_error("delete command", e);
        }
        self.reload_commands();
    }

    pub fn save_settings(&mut self, settings: Settings) {
        if let Err(e) = self.store.save_settings(&settings) {
            self.record_error("save settings", e);
        }
        self.settings = settings;
    }

    // --- Execution sessions -----------------------------------------------

    /// Start (or restart) a run for the given command. A row that is already
    /// running keeps its session; the run trigger is disabled in that case.
    pub fn start_run(&mut self, command_id: i64) {
        if self
            .sessions
            .get(&command_id)
            .is_some_and(|s| s.running)
        {
            return;
        }
        let Some(command) = self
            .commands
            .iter()
            .find(|c| c.id == Some(command_id))
            .cloned()
        else {
            return;
        };
        let Some(tx) = self.runner_tx.clone() else {
            return;
        };

        self.next_session += 1;
        let session = self.next_session;
        let handle = runner::spawn_run(tx, session, &self.settings.shell, &command.command);
        self.sessions
            .insert(command_id, RunSession::new(session, handle));
    }

    /// Kill a running command; the session stays visible until collapsed.
    pub fn cancel_run(&mut self, command_id: i64) {
        if let Some(session) = self.sessions.get_mut(&command_id) {
            if session.running {
                session.cancelled = true;
                if let Some(handle) = session.handle.as_mut() {
                    handle.kill();
                }
            }
        }
    }

    /// Collapse the output pane, destroying the session. A still-running
    /// child is killed first.
    pub fn drop_session(&mut self, command_id: i64) {
        if let Some(mut session) = self.sessions.remove(&command_id) {
            if session.running {
                if let Some(handle) = session.handle.as_mut() {
                    handle.kill();
                }
            }
        }
    }
}
