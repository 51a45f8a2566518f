use crate::{state::AppState, theme::Theme};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

const PLACEHOLDER: &str = "Type a message...";
const WAITING: &str = "Waiting for Lumen...";

/// Footer component displaying the composer, mic indicator and hints
///
/// - Row 1: separator
/// - Rows 2..: input card with a 2 column accent bar
/// - Last card row: mic indicator
/// - Last row: keyboard hints
pub struct Footer<'a> {
    state: &'a AppState,
}

impl<'a> Footer<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.height < 4 {
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(2), Constraint::Length(1)])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled("─".repeat(area.width as usize), Theme::muted()))),
            rows[0],
        );

        self.render_input_card(frame, rows[1]);
        self.render_hints(frame, rows[2]);
    }

    fn render_input_card(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.width < 10 || area.height < 2 {
            return;
        }

        let controls = &self.state.controls;
        frame.render_widget(Block::default().style(Theme::panel()), area);

        let accent_width = 2;
        let accent = if controls.input_enabled { Theme::BLUE } else { Theme::BORDER };
        frame.render_widget(
            Block::default().style(Style::default().bg(accent)),
            Rect { width: accent_width, ..area },
        );

        let input_area = Rect {
            x: area.x + accent_width + 1,
            y: area.y,
            width: area.width.saturating_sub(accent_width + 2),
            height: area.height - 1,
        };
        frame.render_widget(Paragraph::new(self.input_lines(input_area.height as usize)), input_area);

        let status_area = Rect { y: area.y + area.height - 1, height: 1, ..input_area };
        frame.render_widget(Paragraph::new(self.mic_indicator()), status_area);
    }

    /// Composer lines with the block cursor, keeping the cursor row in view
    fn input_lines(&self, rows: usize) -> Vec<Line<'static>> {
        let controls = &self.state.controls;
        let input = &self.state.input;
        let text_style = Style::default().fg(Theme::FG).bg(Theme::PANEL_BG);
        let cursor_style = Style::default().fg(Theme::FG).bg(Theme::FG);

        if !controls.input_enabled {
            return vec![Line::from(Span::styled(WAITING, Style::default().fg(Theme::MUTED).bg(Theme::PANEL_BG)))];
        }

        if input.buffer.is_empty() {
            return vec![Line::from(vec![
                Span::styled("█", cursor_style),
                Span::styled(PLACEHOLDER, Style::default().fg(Theme::MUTED).bg(Theme::PANEL_BG)),
            ])];
        }

        let (before, after) = input.split_at_cursor();
        let before_lines: Vec<&str> = before.split('\n').collect();
        let cursor_row = before_lines.len() - 1;

        let mut lines: Vec<Line<'static>> = Vec::new();
        for (row, text) in before_lines.iter().enumerate() {
            if row < cursor_row {
                lines.push(Line::from(Span::styled(text.to_string(), text_style)));
            }
        }

        let mut after_lines = after.split('\n');
        let mut cursor_line = vec![Span::styled(before_lines[cursor_row].to_string(), text_style)];
        cursor_line.push(Span::styled("█", cursor_style));
        if let Some(rest) = after_lines.next() {
            cursor_line.push(Span::styled(rest.to_string(), text_style));
        }
        lines.push(Line::from(cursor_line));
        lines.extend(after_lines.map(|text| Line::from(Span::styled(text.to_string(), text_style))));

        let first = (cursor_row + 1).saturating_sub(rows);
        lines.into_iter().skip(first).collect()
    }

    fn mic_indicator(&self) -> Line<'static> {
        let controls = &self.state.controls;
        let bg = Theme::PANEL_BG;

        if !controls.mic_visible {
            return Line::default();
        }

        if controls.listening {
            Line::from(vec![
                Span::styled("● ", Style::default().fg(Theme::RED).bg(bg)),
                Span::styled("Listening", Style::default().fg(Theme::RED).bg(bg).add_modifier(Modifier::BOLD)),
            ])
        } else if controls.mic_enabled {
            Line::from(Span::styled("○ Mic off", Style::default().fg(Theme::MUTED).bg(bg)))
        } else {
            Line::from(Span::styled("○ Mic unavailable", Style::default().fg(Theme::BORDER).bg(bg)))
        }
    }

    fn render_hints(&self, frame: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::new();
        for (i, (key, label)) in self.hints().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!("[{}]", key), Style::default().fg(Theme::BLUE)));
            spans.push(Span::styled(format!(" {}", label), Theme::muted()));
        }

        frame.render_widget(
            Paragraph::new(Line::from(spans))
                .block(Block::default().style(Theme::base()))
                .alignment(Alignment::Right),
            area,
        );
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        let controls = &self.state.controls;
        let mut hints = Vec::new();

        if controls.send_enabled {
            hints.push(("Enter", "send"));
            hints.push(("Shift+Enter", "newline"));
        }
        if controls.mic_usable() {
            hints.push(("Ctrl+R", if controls.listening { "stop mic" } else { "mic" }));
        }
        hints.push(("PgUp/PgDn", "scroll"));
        hints.push(("Esc", "quit"));
        hints
    }
}
