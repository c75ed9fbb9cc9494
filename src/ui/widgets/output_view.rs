//! Inline command output widget
//!
//! Renders a session's accumulated output, wrapped, pinned to the most
//! recent lines while the command is still producing them.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme;

pub struct OutputView<'a> {
    text: &'a str,
    title: String,
    border_style: Style,
}

impl<'a> OutputView<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            title: " Output ".to_string(),
            border_style: theme::border(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Number of terminal rows the text occupies once wrapped to `width`
    fn wrapped_rows(text: &str, width: usize) -> usize {
        if width == 0 {
            return 0;
        }
        text.lines()
            .map(|line| {
                let chars = line.chars().count();
                if chars == 0 {
                    1
                } else {
                    chars.div_ceil(width)
                }
            })
            .sum()
    }
}

impl Widget for OutputView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.border_style)
            .title(Span::styled(self.title, theme::title()));

        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;

        // Pin the view to the bottom of the buffer
        let rows = Self::wrapped_rows(self.text, inner_width);
        let scroll = rows.saturating_sub(inner_height) as u16;

        let paragraph = Paragraph::new(self.text)
            .style(theme::text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));

        paragraph.render(area, buf);
    }
}
