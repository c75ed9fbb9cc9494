//! Main screen: saved commands with an inline output pane

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget},
    Frame,
};

use crate::app::App;
use crate::runner::RunOutcome;
use crate::ui::layout::{deck_layout, main_layout};
use crate::ui::theme;
use crate::ui::widgets::{OutputView, Spinner};

pub fn draw(frame: &mut Frame, selected: usize, confirming_delete: Option<i64>, app: &App) {
    let (header, content, footer) = main_layout(frame.area());

    draw_header(frame, header, app);

    // The output pane appears once the selected row has a session
    let session = app
        .commands
        .get(selected)
        .and_then(|c| c.id)
        .and_then(|id| app.sessions.get(&id));

    if let Some(session) = session {
        let (list_area, output_area) = deck_layout(content);
        draw_list(frame, list_area, selected, confirming_delete, app);
        draw_output(frame, output_area, session, app);
    } else {
        draw_list(frame, content, selected, confirming_delete, app);
    }

    draw_footer(frame, footer, session.is_some());
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::styled(" CMDDECK ", theme::title()),
        Span::styled(
            format!("· {} commands · shell: {} ", app.commands.len(), app.settings.shell),
            theme::dim(),
        ),
    ]);
    let header = Paragraph::new(title)
        .block(Block::default().borders(Borders::BOTTOM).border_style(theme::border()));
    frame.render_widget(header, area);
}

fn draw_list(
    frame: &mut Frame,
    area: Rect,
    selected: usize,
    confirming_delete: Option<i64>,
    app: &App,
) {
    if app.commands.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No commands yet. Press [a] to add one.",
                theme::dim(),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(theme::border()));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .commands
        .iter()
        .enumerate()
        .map(|(i, command)| {
            let is_selected = i == selected;
            let name_style = if is_selected {
                theme::selected()
            } else {
                theme::text()
            };

            let mut spans = vec![
                Span::styled(if is_selected { "> " } else { "  " }, name_style),
                Span::styled(command.name.clone(), name_style),
                Span::styled(format!("  {}", command.command), theme::command_text()),
            ];

            if confirming_delete.is_some() && confirming_delete == command.id {
                spans.push(Span::styled("  [d] again to delete", theme::warning()));
            } else if let Some(session) = command.id.and_then(|id| app.sessions.get(&id)) {
                if session.running {
                    spans.push(Span::styled(
                        format!("  {} running", Spinner::new(app.spinner_state).char()),
                        theme::key_hint(),
                    ));
                } else if let Some(label) = session.status_label() {
                    let style = match &session.outcome {
                        Some(RunOutcome::Exited { code: Some(0) }) => theme::success(),
                        Some(RunOutcome::Killed) => theme::warning(),
                        _ => theme::error(),
                    };
                    spans.push(Span::styled(format!("  [{}]", label), style));
                }
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border())
            .title(Span::styled(" Commands ", theme::title())),
    );
    let mut state = ListState::default().with_selected(Some(selected));
    StatefulWidget::render(list, area, frame.buffer_mut(), &mut state);
}

fn draw_output(frame: &mut Frame, area: Rect, session: &crate::app::RunSession, app: &App) {
    let (title, border) = if session.running {
        (
            format!(" Output {} ", Spinner::new(app.spinner_state).char()),
            theme::border_active(),
        )
    } else {
        match &session.outcome {
            Some(RunOutcome::Exited { code: Some(0) }) => {
                (" Output — done ".to_string(), theme::success())
            }
            Some(outcome) => (
                format!(
                    " Output — {} ",
                    match outcome {
                        RunOutcome::Exited { code: Some(code) } => format!("exit {}", code),
                        RunOutcome::Exited { code: None } => "signalled".to_string(),
                        RunOutcome::Killed => "killed".to_string(),
                        RunOutcome::Failed { .. } => "failed".to_string(),
                    }
                ),
                theme::error(),
            ),
            None => (" Output ".to_string(), theme::border()),
        }
    };

    frame.render_widget(
        OutputView::new(&session.output)
            .title(title)
            .border_style(border),
        area,
    );
}

fn draw_footer(frame: &mut Frame, area: Rect, has_session: bool) {
    let mut spans = vec![
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Navigate  [", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Run  [", theme::dim()),
        Span::styled("a", theme::key_hint()),
        Span::styled("]dd  [", theme::dim()),
        Span::styled("e", theme::key_hint()),
        Span::styled("]dit  [", theme::dim()),
        Span::styled("d", theme::key_hint()),
        Span::styled("]elete  [", theme::dim()),
        Span::styled("s", theme::key_hint()),
        Span::styled("]hell  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("]uit", theme::dim()),
    ];
    if has_session {
        spans.extend([
            Span::styled("  [", theme::dim()),
            Span::styled("x", theme::key_hint()),
            Span::styled("] Kill  [", theme::dim()),
            Span::styled("o", theme::key_hint()),
            Span::styled("] Collapse", theme::dim()),
        ]);
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
