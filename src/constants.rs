//! Application-wide constants

use std::path::PathBuf;

/// Shell used when the settings row is missing or freshly seeded
pub const DEFAULT_SHELL: &str = "zsh";

/// Shells offered by the settings picker
pub const AVAILABLE_SHELLS: &[&str] = &["zsh", "bash", "sh"];

/// Database file name inside the data directory
pub const DB_FILE: &str = "cmddeck.sqlite";

/// Maximum bytes retained per session output buffer
pub const OUTPUT_BUFFER_BYTES: usize = 256 * 1024;

/// Event poll timeout in milliseconds
pub const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Spinner animation interval in milliseconds
pub const SPINNER_TICK_MS: u128 = 100;

/// Channel buffer size for runner messages
pub const RUNNER_CHANNEL_SIZE: usize = 100;

/// Maximum length for user text input (prevents memory exhaustion)
pub const MAX_INPUT_LENGTH: usize = 500;

/// Application data directory (`~/.local/share/cmddeck` on Linux)
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("cmddeck"))
        .unwrap_or_else(|| PathBuf::from("/tmp/cmddeck"))
}
