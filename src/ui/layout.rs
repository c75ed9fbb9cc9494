//! Common layout helpers

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered box with fixed width and height
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Split area into header, content, and footer
pub fn main_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Content
            Constraint::Length(2), // Footer
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Split the content area into the command list and the output pane
pub fn deck_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Command list
            Constraint::Percentage(45), // Output
        ])
        .split(area);
    (chunks[0], chunks[1])
}
