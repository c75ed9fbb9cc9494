//! Keyboard input handlers for the application

use crossterm::event::KeyCode;

use super::state::{validate_form, AppMode, CommandForm, FormField};
use super::App;
use crate::constants::{AVAILABLE_SHELLS, MAX_INPUT_LENGTH};
use crate::store::{Command, Settings};

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) {
        // Handle exit confirmation dialog
        if self.show_exit_confirm {
            match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.show_exit_confirm = false;
                }
                _ => {}
            }
            return;
        }

        // The error banner swallows one Esc to dismiss itself
        if self.error.is_some() && key == KeyCode::Esc {
            self.clear_error();
            return;
        }

        match &mut self.mode {
            AppMode::List { .. } => self.handle_list_key(key),
            AppMode::Form(_) => self.handle_form_key(key),
            AppMode::Settings { .. } => self.handle_settings_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyCode) {
        let AppMode::List {
            selected,
            confirming_delete,
        } = &mut self.mode
        else {
            return;
        };
        let selected_id = self.commands.get(*selected).and_then(|c| c.id);

        // Any key other than the second delete press resets the confirmation
        if !matches!(key, KeyCode::Char('d')) {
            *confirming_delete = None;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < self.commands.len() {
                    *selected += 1;
                }
            }
            KeyCode::Char('a') => {
                self.mode = AppMode::Form(CommandForm::add());
            }
            KeyCode::Char('e') => {
                if let Some(command) = self.commands.get(*selected) {
                    self.mode = AppMode::Form(CommandForm::edit(command));
                }
            }
            KeyCode::Char('d') => {
                let Some(id) = selected_id else { return };
                if *confirming_delete == Some(id) {
                    let keep = (*selected).min(self.commands.len().saturating_sub(2));
                    self.delete_command(id);
                    self.mode = AppMode::List {
                        selected: keep,
                        confirming_delete: None,
                    };
                } else {
                    *confirming_delete = Some(id);
                }
            }
            KeyCode::Enter | KeyCode::Char('r') => {
                if let Some(id) = selected_id {
                    self.start_run(id);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = selected_id {
                    self.cancel_run(id);
                }
            }
            KeyCode::Char('o') => {
                if let Some(id) = selected_id {
                    self.drop_session(id);
                }
            }
            KeyCode::Char('s') => {
                let current = AVAILABLE_SHELLS
                    .iter()
                    .position(|s| *s == self.settings.shell)
                    .unwrap_or(0);
                self.mode = AppMode::Settings { selected: current };
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.show_exit_confirm = true;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let AppMode::Form(form) = &mut self.mode else {
            return;
        };

        match key {
            KeyCode::Esc => {
                let back = form
                    .editing
                    .and_then(|id| self.commands.iter().position(|c| c.id == Some(id)))
                    .unwrap_or(0);
                self.mode = AppMode::List {
                    selected: back,
                    confirming_delete: None,
                };
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                form.field = match form.field {
                    FormField::Name => FormField::Command,
                    FormField::Command => FormField::Name,
                };
            }
            KeyCode::Backspace => {
                form.active_input().pop();
                form.error = None;
            }
            KeyCode::Enter => {
                if let Some(problem) = validate_form(form) {
                    form.error = Some(problem);
                    return;
                }
                let form = form.clone();
                self.submit_form(form);
            }
            KeyCode::Char(c) => {
                let input = form.active_input();
                if input.len() < MAX_INPUT_LENGTH {
                    input.push(c);
                }
                form.error = None;
            }
            _ => {}
        }
    }

    /// Persist a validated form and return to the list with the affected
    /// row selected.
    fn submit_form(&mut self, form: CommandForm) {
        match form.editing {
            Some(id) => {
                self.save_edit(&Command {
                    id: Some(id),
                    name: form.name,
                    command: form.command,
                });
            }
            None => self.add_command(form.name, form.command),
        }

        let selected = match form.editing {
            Some(id) => self
                .commands
                .iter()
                .position(|c| c.id == Some(id))
                .unwrap_or(0),
            None => self.commands.len().saturating_sub(1),
        };
        self.mode = AppMode::List {
            selected,
            confirming_delete: None,
        };
    }

    fn handle_settings_key(&mut self, key: KeyCode) {
        let AppMode::Settings { selected } = &mut self.mode else {
            return;
        };

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                *selected = selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if *selected + 1 < AVAILABLE_SHELLS.len() {
                    *selected += 1;
                }
            }
            KeyCode::Enter => {
                let shell = AVAILABLE_SHELLS[*selected].to_string();
                self.save_settings(Settings { shell });
                self.mode = AppMode::list();
            }
            KeyCode::Esc => {
                self.mode = AppMode::list();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CommandStore;

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let store = CommandStore::open(dir.path()).unwrap();
        (dir, App::new(store))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn add_form_inserts_and_selects_the_new_row() {
        let (_dir, mut app) = test_app();

        app.handle_key(KeyCode::Char('a'));
        assert!(matches!(app.mode, AppMode::Form(_)));

        type_str(&mut app, "disk");
        app.handle_key(KeyCode::Tab);
        type_str(&mut app, "df -h");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.commands.len(), 1);
        assert_eq!(app.commands[0].name, "disk");
        assert!(matches!(app.mode, AppMode::List { selected: 0, .. }));
    }

    #[test]
    fn empty_form_is_rejected_with_a_message() {
        let (_dir, mut app) = test_app();

        app.handle_key(KeyCode::Char('a'));
        app.handle_key(KeyCode::Enter);

        let AppMode::Form(form) = &app.mode else {
            panic!("expected to stay in the form");
        };
        assert!(form.error.is_some());
        assert!(app.commands.is_empty());
    }

    #[test]
    fn delete_requires_two_presses() {
        let (_dir, mut app) = test_app();
        app.add_command("a".to_string(), "true".to_string());

        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.commands.len(), 1);
        let AppMode::List {
            confirming_delete, ..
        } = &app.mode
        else {
            panic!("expected list mode");
        };
        assert!(confirming_delete.is_some());

        app.handle_key(KeyCode::Char('d'));
        assert!(app.commands.is_empty());
    }

    #[test]
    fn any_other_key_resets_delete_confirmation() {
        let (_dir, mut app) = test_app();
        app.add_command("a".to_string(), "true".to_string());
        app.add_command("b".to_string(), "true".to_string());

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('d'));
        // Two rows still present: the second 'd' started a fresh confirmation
        assert_eq!(app.commands.len(), 2);
    }

    #[test]
    fn edit_updates_in_place() {
        let (_dir, mut app) = test_app();
        app.add_command("old".to_string(), "true".to_string());
        let id = app.commands[0].id;

        app.handle_key(KeyCode::Char('e'));
        for _ in 0..3 {
            app.handle_key(KeyCode::Backspace);
        }
        type_str(&mut app, "new");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.commands.len(), 1);
        assert_eq!(app.commands[0].id, id);
        assert_eq!(app.commands[0].name, "new");
    }

    #[test]
    fn settings_picker_saves_the_chosen_shell() {
        let (_dir, mut app) = test_app();

        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.settings.shell, AVAILABLE_SHELLS[1]);
        assert!(matches!(app.mode, AppMode::List { .. }));
    }

    #[test]
    fn esc_dismisses_the_error_banner_first() {
        let (_dir, mut app) = test_app();
        app.error = Some("boom".to_string());

        app.handle_key(KeyCode::Esc);
        assert!(app.error.is_none());
        assert!(!app.show_exit_confirm);

        app.handle_key(KeyCode::Esc);
        assert!(app.show_exit_confirm);
    }
}
