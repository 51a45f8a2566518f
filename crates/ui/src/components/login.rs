use crate::{layout::centered_rect, state::AppState, theme::Theme};

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

const LUMEN_LOGO: [&str; 3] = [r"█   █ █ █▄ ▄█ █▀▀ █▄ █", r"█   █ █ █ ▀ █ █▀  █ ▀█", r"▀▀▀ ▀▀▀ ▀   ▀ ▀▀▀ ▀  ▀"];

const TAGLINE: &str = "A conversational assistant powered by Gemini";

/// Centered login card. Shows the diagnostic instead of the login prompt
/// when the credential is missing.
pub struct LoginView<'a> {
    state: &'a AppState,
}

impl<'a> LoginView<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Block::default().style(Theme::base()), area);

        let card_width = 60.min(area.width.saturating_sub(4));
        let card = centered_rect(area, card_width, self.card_height(card_width));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .style(Theme::panel())
            .padding(Padding::new(2, 2, 1, 1));

        frame.render_widget(
            Paragraph::new(self.lines())
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            card,
        );
    }

    fn card_height(&self, card_width: u16) -> u16 {
        let text_width = card_width.saturating_sub(6).max(1) as usize;
        let diagnostic_rows = self
            .state
            .login
            .diagnostic
            .as_deref()
            .map(|d| textwrap::wrap(d, text_width).len() as u16 + 1)
            .unwrap_or(0);
        LUMEN_LOGO.len() as u16 + diagnostic_rows + 9
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let bg = Theme::PANEL_BG;
        let mut lines: Vec<Line<'static>> = LUMEN_LOGO
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let color = if idx < 2 { Theme::CYAN } else { Theme::BLUE };
                Line::from(Span::styled(*row, Style::default().fg(color).bg(bg)))
            })
            .collect();

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(TAGLINE, Style::default().fg(Theme::MUTED).bg(bg))));
        lines.push(Line::default());

        let login = &self.state.login;
        if let Some(diagnostic) = &login.diagnostic {
            lines.push(Line::from(Span::styled(diagnostic.clone(), Style::default().fg(Theme::RED).bg(bg))));
            lines.push(Line::default());
        }

        let button = if login.enabled {
            Line::from(vec![
                Span::styled("[Enter]", Style::default().fg(Theme::BLUE).bg(bg).add_modifier(Modifier::BOLD)),
                Span::styled(" Log in", Style::default().fg(Theme::FG).bg(bg)),
            ])
        } else {
            Line::from(Span::styled("Log in unavailable", Style::default().fg(Theme::BORDER).bg(bg)))
        };
        lines.push(button);
        lines.push(Line::from(vec![
            Span::styled("[Esc]", Style::default().fg(Theme::BLUE).bg(bg)),
            Span::styled(" quit", Style::default().fg(Theme::MUTED).bg(bg)),
        ]));

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LoginState;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_login_prompt() {
        let state = AppState::default();
        let rendered = text(&LoginView::new(&state).lines());
        assert!(rendered.contains("[Enter] Log in"));
        assert!(!rendered.contains("unavailable"));
    }

    #[test]
    fn test_diagnostic_replaces_prompt() {
        let state = AppState::new(LoginState::blocked("API Key is missing."), false, "gemini");
        let rendered = text(&LoginView::new(&state).lines());
        assert!(rendered.contains("API Key is missing."));
        assert!(rendered.contains("Log in unavailable"));
        assert!(!rendered.contains("[Enter]"));
    }
}
