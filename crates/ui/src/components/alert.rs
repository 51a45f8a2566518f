//! Blocking alert popup
//!
//! Shown for voice input failures. Any key dismisses it.

use crate::{layout::centered_rect, theme::Theme};

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};

const MAX_WIDTH: u16 = 64;

pub struct AlertPopup<'a> {
    message: &'a str,
}

impl<'a> AlertPopup<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Size the popup to the wrapped message
    fn popup_area(&self, area: Rect) -> Rect {
        let width = MAX_WIDTH.min(area.width.saturating_sub(4)).max(20);
        let text_width = width.saturating_sub(4).max(1) as usize;
        let text_lines = textwrap::wrap(self.message, text_width).len() as u16;
        centered_rect(area, width, text_lines + 6)
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let popup_area = self.popup_area(area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(" Alert ", Theme::error()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::RED))
            .style(Theme::panel())
            .padding(Padding::new(1, 1, 1, 0));

        let mut lines: Vec<Line> = self.message.lines().map(|l| Line::from(l.to_string())).collect();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Press any key to dismiss", Theme::muted())).alignment(Alignment::Right));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            popup_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_fits_area() {
        let popup = AlertPopup::new("Microphone access was denied.");
        let area = Rect::new(0, 0, 120, 40);
        let rect = popup.popup_area(area);
        assert_eq!(rect.width, MAX_WIDTH);
        assert!(rect.height >= 7);
        assert!(rect.x > 0 && rect.y > 0);
    }

    #[test]
    fn test_popup_narrow_terminal() {
        let popup = AlertPopup::new("An error occurred with voice recognition: audio-capture");
        let rect = popup.popup_area(Rect::new(0, 0, 30, 20));
        assert!(rect.width <= 30);
    }
}
