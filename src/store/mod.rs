//! SQLite-backed persistence for commands and settings
//!
//! One `command` table plus a singleton `settings` row, kept in a database
//! file under the application data directory. All access goes through a
//! single connection behind a mutex: reads and writes are serialized, so
//! concurrent UI triggers never observe partial mutation.

mod error;
mod models;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

pub use error::StoreError;
pub use models::{Command, Settings};

use crate::constants::{DB_FILE, DEFAULT_SHELL};

/// Fixed primary key of the singleton settings row
const SETTINGS_ROW_ID: i64 = 1;

/// Schema, applied on every open. `AUTOINCREMENT` keeps deleted command ids
/// from ever being reassigned.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS command (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    command TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    id    INTEGER PRIMARY KEY,
    shell TEXT NOT NULL
);
";

/// Durable store for [`Command`] rows and the [`Settings`] singleton.
pub struct CommandStore {
    conn: Mutex<Connection>,
}

impl CommandStore {
    /// Open (creating if absent) the database under `data_dir`.
    ///
    /// Creates the directory, the file, and the tables as needed, and seeds
    /// the settings row with the default shell on first launch. Failure here
    /// means no durable storage is available; the caller decides whether
    /// that is fatal.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::Init {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let conn = Connection::open(data_dir.join(DB_FILE))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        // Seed the singleton settings row on a fresh database
        let have_settings: i64 =
            conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        if have_settings == 0 {
            conn.execute(
                "INSERT INTO settings (id, shell) VALUES (?1, ?2)",
                params![SETTINGS_ROW_ID, DEFAULT_SHELL],
            )?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means another caller panicked mid-operation;
        // the connection itself is still usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All saved commands, in insertion (rowid) order.
    pub fn list_commands(&self) -> Result<Vec<Command>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, command FROM command ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Command {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                command: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Insert a not-yet-persisted command, returning it with its new id.
    pub fn insert_command(&self, command: Command) -> Result<Command, StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO command (name, command) VALUES (?1, ?2)",
            params![command.name, command.command],
        )?;
        Ok(Command {
            id: Some(conn.last_insert_rowid()),
            ..command
        })
    }

    /// Overwrite name and command text for the row matching `command.id`.
    pub fn update_command(&self, command: &Command) -> Result<(), StoreError> {
        let id = command.id.ok_or(StoreError::MissingId)?;
        let changed = self.conn().execute(
            "UPDATE command SET name = ?1, command = ?2 WHERE id = ?3",
            params![command.name, command.command, id],
        )?;
        if changed == 0 {
            return Err(StoreError::CommandNotFound(id));
        }
        Ok(())
    }

    /// Remove the row with this id. Deleting an id that does not exist is a
    /// no-op, not an error.
    pub fn delete_command(&self, id: i64) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM command WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// The settings row, or defaults if it is somehow absent.
    pub fn settings(&self) -> Result<Settings, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT shell FROM settings WHERE id = ?1",
                params![SETTINGS_ROW_ID],
                |row| {
                    Ok(Settings {
                        shell: row.get(0)?,
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_default())
    }

    /// Upsert the singleton settings row.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO settings (id, shell) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET shell = excluded.shell",
            params![SETTINGS_ROW_ID, settings.shell],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, CommandStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CommandStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn crud_round_trip() {
        let (_dir, store) = open_temp();

        let a = store
            .insert_command(Command::new("list", "ls -la"))
            .unwrap();
        let b = store
            .insert_command(Command::new("uptime", "uptime"))
            .unwrap();
        assert!(a.id.is_some());
        assert_eq!(store.list_commands().unwrap(), vec![a.clone(), b.clone()]);

        let mut edited = a.clone();
        edited.name = "list all".to_string();
        edited.command = "ls -lah".to_string();
        store.update_command(&edited).unwrap();

        store.delete_command(b.id.unwrap()).unwrap();
        assert_eq!(store.list_commands().unwrap(), vec![edited]);
    }

    #[test]
    fn ids_are_never_reused() {
        let (_dir, store) = open_temp();

        let first = store.insert_command(Command::new("a", "true")).unwrap();
        let first_id = first.id.unwrap();
        store.delete_command(first_id).unwrap();

        let second = store.insert_command(Command::new("b", "true")).unwrap();
        assert!(second.id.unwrap() > first_id);
    }

    #[test]
    fn fresh_store_seeds_default_settings() {
        let (_dir, store) = open_temp();

        assert_eq!(store.settings().unwrap().shell, DEFAULT_SHELL);
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn settings_round_trip() {
        let (_dir, store) = open_temp();

        let settings = Settings {
            shell: "bash".to_string(),
        };
        store.save_settings(&settings).unwrap();
        assert_eq!(store.settings().unwrap(), settings);

        // Still exactly one row after the upsert
        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_missing_id_is_a_noop() {
        let (_dir, store) = open_temp();

        let kept = store.insert_command(Command::new("keep", "true")).unwrap();
        store.delete_command(9999).unwrap();
        assert_eq!(store.list_commands().unwrap(), vec![kept]);
    }

    #[test]
    fn update_missing_id_errors() {
        let (_dir, store) = open_temp();

        let ghost = Command {
            id: Some(42),
            name: "ghost".to_string(),
            command: "true".to_string(),
        };
        assert!(matches!(
            store.update_command(&ghost),
            Err(StoreError::CommandNotFound(42))
        ));

        let unsaved = Command::new("unsaved", "true");
        assert!(matches!(
            store.update_command(&unsaved),
            Err(StoreError::MissingId)
        ));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let saved = {
            let store = CommandStore::open(dir.path()).unwrap();
            store
                .save_settings(&Settings {
                    shell: "sh".to_string(),
                })
                .unwrap();
            store.insert_command(Command::new("echo", "echo hi")).unwrap()
        };

        let store = CommandStore::open(dir.path()).unwrap();
        assert_eq!(store.list_commands().unwrap(), vec![saved]);
        assert_eq!(store.settings().unwrap().shell, "sh");
    }
}
