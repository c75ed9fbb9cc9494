//! Default-shell settings screen

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::constants::AVAILABLE_SHELLS;
use crate::ui::layout::centered_fixed;
use crate::ui::theme;
use crate::ui::widgets::MenuList;

pub fn draw(frame: &mut Frame, selected: usize) {
    let area = frame.area();
    let list_height = AVAILABLE_SHELLS.len() as u16 + 2;
    let popup = centered_fixed(44, list_height + 2, area);
    frame.render_widget(Clear, popup);

    let list_area = Rect {
        height: list_height.min(popup.height),
        ..popup
    };
    let list = MenuList::new(AVAILABLE_SHELLS.to_vec(), selected).title(" Default Shell ");
    frame.render_widget(list, list_area);

    let hint_area = Rect {
        y: popup.y + list_height + 1,
        height: 1,
        ..popup
    };
    if hint_area.y >= area.bottom() {
        return;
    }
    let hints = Paragraph::new(Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Select  [", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Save  [", theme::dim()),
        Span::styled("Esc", theme::key_hint()),
        Span::styled("] Cancel", theme::dim()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hints, hint_area);
}
