//! Row types for the command store

/// A saved shell command.
///
/// `id` is `None` until the row has been inserted; storage assigns it and it
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: Option<i64>,
    pub name: String,
    pub command: String,
}

impl Command {
    /// A not-yet-persisted command
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            command: command.into(),
        }
    }
}

/// Global settings. Stored as a single row with a fixed id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Default shell executable name (e.g. "zsh"), resolved under /bin
    pub shell: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell: crate::constants::DEFAULT_SHELL.to_string(),
        }
    }
}
