//! Application state types and enums

use crate::runner::{RunHandle, RunOutcome, SessionId};

/// Application mode/screen
#[derive(Debug)]
pub enum AppMode {
    /// Main command list with the inline output pane
    List {
        selected: usize,
        /// Set after the first press of delete; a second press confirms
        confirming_delete: Option<i64>,
    },
    /// Add or edit form
    Form(CommandForm),
    /// Default-shell picker
    Settings { selected: usize },
}

impl AppMode {
    pub fn list() -> Self {
        AppMode::List {
            selected: 0,
            confirming_delete: None,
        }
    }
}

/// Which form field is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Command,
}

/// State of the add/edit form
#[derive(Debug, Clone, Default)]
pub struct CommandForm {
    /// Id of the command being edited; `None` when adding a new one
    pub editing: Option<i64>,
    pub name: String,
    pub command: String,
    pub field: FormField,
    pub error: Option<String>,
}

impl CommandForm {
    pub fn add() -> Self {
        Self::default()
    }

    pub fn edit(command: &crate::store::Command) -> Self {
        Self {
            editing: command.id,
            name: command.name.clone(),
            command: command.command.clone(),
            ..Self::default()
        }
    }

    /// The field currently receiving keystrokes
    pub fn active_input(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Command => &mut self.command,
        }
    }
}

/// Validate form input before it reaches storage. Storage itself accepts
/// anything; non-empty fields are a UI contract.
pub fn validate_form(form: &CommandForm) -> Option<String> {
    if form.name.trim().is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if form.command.trim().is_empty() {
        return Some("Command cannot be empty".to_string());
    }
    None
}

/// One command's transient execution state, owned by the UI row that
/// triggered it. Dropped when the output pane is collapsed or replaced when
/// a new run starts.
#[derive(Debug)]
pub struct RunSession {
    pub session: SessionId,
    pub running: bool,
    /// Accumulated combined output, ANSI-stripped
    pub output: String,
    /// Terminal state once the run has ended
    pub outcome: Option<RunOutcome>,
    /// True after a kill was requested; suppresses trailing chunks
    pub cancelled: bool,
    pub handle: Option<RunHandle>,
}

impl RunSession {
    pub fn new(session: SessionId, handle: RunHandle) -> Self {
        Self {
            session,
            running: true,
            output: String::new(),
            outcome: None,
            cancelled: false,
            handle: Some(handle),
        }
    }

    /// Short status marker for the list row
    pub fn status_label(&self) -> Option<String> {
        if self.running {
            return None;
        }
        match self.outcome.as_ref()? {
            RunOutcome::Exited { code: Some(0) } => Some("ok".to_string()),
            RunOutcome::Exited { code: Some(code) } => Some(format!("exit {}", code)),
            RunOutcome::Exited { code: None } => Some("signal".to_string()),
            RunOutcome::Killed => Some("killed".to_string()),
            RunOutcome::Failed { .. } => Some("failed".to_string()),
        }
    }
}
