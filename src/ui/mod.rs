//! UI rendering module

mod layout;
mod screens;
pub mod theme;
pub mod widgets;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppMode};
use layout::centered_fixed;

/// Main draw function - dispatches to appropriate screen
pub fn draw(frame: &mut Frame, app: &App) {
    match &app.mode {
        AppMode::List {
            selected,
            confirming_delete,
        } => {
            screens::command_list::draw(frame, *selected, *confirming_delete, app);
        }
        AppMode::Form(form) => {
            // Keep the list visible behind the form popup
            let behind = form
                .editing
                .and_then(|id| app.commands.iter().position(|c| c.id == Some(id)))
                .unwrap_or(0);
            screens::command_list::draw(frame, behind, None, app);
            screens::command_form::draw(frame, form);
        }
        AppMode::Settings { selected } => {
            screens::command_list::draw(frame, 0, None, app);
            screens::settings::draw(frame, *selected);
        }
    }

    // Latest storage error, shown over everything but the exit confirm
    if let Some(error) = &app.error {
        draw_error_banner(frame, error);
    }

    // Render exit confirmation popup on top of any screen
    if app.show_exit_confirm {
        draw_exit_confirm(frame);
    }
}

/// One-line error banner at the bottom of the screen
fn draw_error_banner(frame: &mut Frame, error: &str) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let banner_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
    frame.render_widget(Clear, banner_area);

    let banner = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", error), theme::error()),
        Span::styled("[Esc] dismiss", theme::dim()),
    ]));
    frame.render_widget(banner, banner_area);
}

/// Draw the exit confirmation popup centered on screen
fn draw_exit_confirm(frame: &mut Frame) {
    let popup_area = centered_fixed(40, 7, frame.area());
    frame.render_widget(Clear, popup_area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Are you sure you want to exit?", theme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Enter/Y", theme::key_hint()),
            Span::styled("] Yes  [", theme::dim()),
            Span::styled("Esc/N", theme::key_hint()),
            Span::styled("] No", theme::dim()),
        ]),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_active())
            .title(Span::styled(" Exit ", theme::title())),
    );
    frame.render_widget(content, popup_area);
}
