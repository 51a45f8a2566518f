use crate::{state::AppState, theme::Theme};

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// One-line header: app title on the left, model and reply status on the right
pub struct Header<'a> {
    state: &'a AppState,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height == 0 {
            return;
        }

        let mut line = Line::from(vec![
            Span::styled(" ◆ ", Style::default().fg(Theme::CYAN)),
            Span::styled("Lumen", Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)),
        ]);

        let status = if self.state.controls.is_locked() {
            Span::styled("● replying", Style::default().fg(Theme::CYAN))
        } else {
            Span::styled("● ready", Style::default().fg(Theme::GREEN))
        };
        let right = vec![
            Span::styled(self.state.model_label.clone(), Style::default().fg(Theme::BLUE)),
            Span::styled(" | ", Theme::muted()),
            status,
            Span::raw(" "),
        ];

        let left_width = line.width();
        let right_width: usize = right.iter().map(|s| s.content.width()).sum();
        let pad = (area.width as usize).saturating_sub(left_width + right_width);
        if pad > 0 {
            line.spans.push(Span::raw(" ".repeat(pad)));
            line.spans.extend(right);
        }

        frame.render_widget(Paragraph::new(line).block(Block::default().style(Theme::base())), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn header_row(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal.draw(|f| Header::new(state).render(f, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        (0..60).map(|x| buffer[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn test_header_shows_model_and_status() {
        let state = AppState::new(crate::state::LoginState::available(), false, "gemini/gemini-2.5-flash");
        let row = header_row(&state);
        assert!(row.contains("Lumen"));
        assert!(row.contains("gemini/gemini-2.5-flash"));
        assert!(row.contains("ready"));
    }

    #[test]
    fn test_header_while_replying() {
        let mut state = AppState::default();
        state.controls.lock();
        assert!(header_row(&state).contains("replying"));
    }
}
