//! Add/edit command form

use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{CommandForm, FormField};
use crate::ui::layout::centered_fixed;
use crate::ui::theme;

pub fn draw(frame: &mut Frame, form: &CommandForm) {
    let area = frame.area();
    let popup = centered_fixed(64.min(area.width.saturating_sub(2)), 11, area);
    frame.render_widget(Clear, popup);

    let title = if form.editing.is_some() {
        " Edit Command "
    } else {
        " Add Command "
    };

    let mut lines = vec![
        Line::from(""),
        field_line("Name:    ", &form.name, form.field == FormField::Name),
        Line::from(""),
        field_line("Command: ", &form.command, form.field == FormField::Command),
        Line::from(""),
    ];

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            theme::error(),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            Span::styled("[", theme::dim()),
            Span::styled("Tab", theme::key_hint()),
            Span::styled("] Switch field  [", theme::dim()),
            Span::styled("Enter", theme::key_hint()),
            Span::styled("] Save  [", theme::dim()),
            Span::styled("Esc", theme::key_hint()),
            Span::styled("] Cancel", theme::dim()),
        ])
        .alignment(Alignment::Center),
    );

    let content = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_active())
            .title(Span::styled(title, theme::title())),
    );
    frame.render_widget(content, popup);
}

fn field_line<'a>(label: &'a str, value: &'a str, active: bool) -> Line<'a> {
    let label_style = if active { theme::title() } else { theme::dim() };
    let mut spans = vec![
        Span::styled("  ", theme::text()),
        Span::styled(label, label_style),
        Span::styled(value, theme::text()),
    ];
    if active {
        // Block cursor at the insertion point
        spans.push(Span::styled("█", theme::key_hint()));
    }
    Line::from(spans)
}
