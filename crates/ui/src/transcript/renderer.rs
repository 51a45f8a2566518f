use super::bubble::{BubbleStatus, MessageBubble};
use super::state::Transcript;
use crate::theme::Theme;

use std::rc::Rc;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const TYPING_FRAMES: [&str; 3] = ["● ∙ ∙", "∙ ● ∙", "∙ ∙ ●"];

/// UI ticks per typing indicator frame
const TICKS_PER_FRAME: u64 = 4;

/// Three pulsing dots for the given UI tick
pub fn typing_indicator(tick: u64) -> &'static str {
    TYPING_FRAMES[((tick / TICKS_PER_FRAME) % TYPING_FRAMES.len() as u64) as usize]
}

/// Renders transcript bubbles to a frame
pub struct TranscriptRenderer<'a> {
    transcript: &'a Transcript,
    tick: u64,
}

impl<'a> TranscriptRenderer<'a> {
    pub fn new(transcript: &'a Transcript, tick: u64) -> Self {
        Self { transcript, tick }
    }

    /// Render into `area`, keeping the scroll offset measured from the bottom
    ///
    /// Only the rows inside the viewport are built, so the cost of a frame
    /// does not grow with the length of the conversation.
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        if area.width < 4 || area.height == 0 {
            return;
        }

        let content_area = Rect { x: area.x + 1, width: area.width.saturating_sub(3), ..area };
        let width = content_area.width as usize;

        if self.transcript.is_empty() {
            let hint = Paragraph::new(Line::from(Span::styled("No messages yet.", Theme::muted())));
            frame.render_widget(hint, content_area);
            return;
        }

        let visible = area.height as usize;
        let total = self.total_lines(width);
        let max_scroll = total.saturating_sub(visible);
        let from_bottom = self.transcript.scroll_offset().min(max_scroll);
        let top = max_scroll - from_bottom;

        let paragraph = Paragraph::new(self.window(width, top, visible)).style(Theme::base());
        frame.render_widget(paragraph, content_area);

        self.render_scrollbar(frame, area, total, top);
    }

    /// All transcript lines wrapped to `width`
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        self.window(width, 0, usize::MAX)
    }

    /// Rendered rows of the whole transcript, separators included
    pub fn total_lines(&self, width: usize) -> usize {
        let bubbles = self.transcript.bubbles();
        let rows: usize = (0..bubbles.len()).map(|index| self.bubble_height(index, width)).sum();
        rows + bubbles.len().saturating_sub(1)
    }

    /// Rows `top..top + height` of the transcript
    pub fn window(&self, width: usize, top: usize, height: usize) -> Vec<Line<'static>> {
        let end = top.saturating_add(height);
        let mut lines = Vec::new();
        let mut row = 0;

        for index in 0..self.transcript.len() {
            if row >= end {
                break;
            }
            if index > 0 {
                if row >= top {
                    lines.push(Line::default());
                }
                row += 1;
            }

            let bubble_height = self.bubble_height(index, width);
            if row + bubble_height > top && row < end {
                let skip = top.saturating_sub(row);
                let take = end.min(row + bubble_height) - (row + skip);
                self.render_bubble(index, width, skip, take, &mut lines);
            }
            row += bubble_height;
        }
        lines
    }

    /// Header row plus body rows of one bubble
    fn bubble_height(&self, index: usize, width: usize) -> usize {
        match self.transcript.bubbles().get(index) {
            Some(bubble) if bubble.is_loading() => 2,
            Some(_) => 1 + self.body(index, width).map_or(1, |body| body.len()),
            None => 0,
        }
    }

    fn body(&self, index: usize, width: usize) -> Option<Rc<[String]>> {
        self.transcript.wrapped_body(index, width.saturating_sub(2).max(1))
    }

    /// Push `take` rows of bubble `index`, starting `skip` rows into it
    fn render_bubble(&self, index: usize, width: usize, skip: usize, take: usize, lines: &mut Vec<Line<'static>>) {
        let Some(bubble) = self.transcript.bubbles().get(index) else {
            return;
        };
        let accent = Theme::bubble_accent(bubble.sender, bubble.status);
        let accent_bar = Span::styled("┃ ", Style::default().fg(accent).bg(Theme::BG));
        let mut rows = Vec::with_capacity(take);

        if skip == 0 {
            rows.push(Self::header(bubble, accent));
        }
        let body_skip = skip.saturating_sub(1);
        let body_take = take - rows.len();

        if bubble.status == BubbleStatus::Loading {
            if body_skip == 0 && body_take > 0 {
                rows.push(Line::from(vec![
                    accent_bar,
                    Span::styled(typing_indicator(self.tick), Style::default().fg(accent)),
                ]));
            }
            lines.extend(rows);
            return;
        }

        let content_style = Theme::bubble_text(bubble.status);
        if let Some(body) = self.body(index, width) {
            for text in body.iter().skip(body_skip).take(body_take) {
                if text.is_empty() {
                    rows.push(Line::from(vec![accent_bar.clone()]));
                } else {
                    rows.push(Line::from(vec![accent_bar.clone(), Span::styled(text.clone(), content_style)]));
                }
            }
        }
        lines.extend(rows);
    }

    fn header(bubble: &MessageBubble, accent: Color) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{} ", bubble.sender.icon()), Style::default().fg(accent)),
            Span::styled(bubble.sender.label(), Style::default().fg(accent).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", bubble.timestamp()), Theme::muted()),
        ])
    }

    /// Scrollbar on the right edge when content overflows
    fn render_scrollbar(&self, frame: &mut Frame<'_>, area: Rect, total: usize, top: usize) {
        let visible = area.height as usize;
        if visible <= 1 || total <= visible {
            return;
        }

        let max_scroll = total - visible;
        let thumb = ((visible * visible) as f64 / total as f64).ceil().max(1.0) as usize;
        let travel = visible.saturating_sub(thumb);
        let position = (top as f64 / max_scroll as f64 * travel as f64).round() as usize;

        let x = area.x + area.width.saturating_sub(1);
        for y in 0..visible {
            let style = if y >= position && y < position + thumb {
                Style::default().fg(Theme::BLUE).bg(Theme::BG)
            } else {
                Style::default().fg(Theme::BORDER).bg(Theme::BG)
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled("│", style))),
                Rect::new(x, area.y + y as u16, 1, 1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Sender;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect()).collect()
    }

    #[test]
    fn test_typing_indicator_cycles() {
        assert_eq!(typing_indicator(0), "● ∙ ∙");
        assert_eq!(typing_indicator(TICKS_PER_FRAME), "∙ ● ∙");
        assert_eq!(typing_indicator(TICKS_PER_FRAME * 2), "∙ ∙ ●");
        assert_eq!(typing_indicator(TICKS_PER_FRAME * 3), "● ∙ ∙");
    }

    #[test]
    fn test_user_bubble_lines() {
        let mut transcript = Transcript::new();
        transcript.append_message(Sender::User, Some("Hello"));

        let lines = text_of(&TranscriptRenderer::new(&transcript, 0).lines(40));
        assert!(lines[0].starts_with("● You"));
        assert_eq!(lines[1], "┃ Hello");
    }

    #[test]
    fn test_loading_bubble_shows_dots() {
        let mut transcript = Transcript::new();
        transcript.show_typing();

        let lines = text_of(&TranscriptRenderer::new(&transcript, 0).lines(40));
        assert!(lines[0].starts_with("◆ Lumen"));
        assert_eq!(lines[1], "┃ ● ∙ ∙");
    }

    #[test]
    fn test_long_text_wraps() {
        let mut transcript = Transcript::new();
        transcript.append_message(Sender::Assistant, Some("one two three four five six"));

        let lines = text_of(&TranscriptRenderer::new(&transcript, 0).lines(12));
        let body: Vec<_> = lines.iter().skip(1).collect();
        assert!(body.len() > 1);
        assert!(body.iter().all(|l| l.starts_with("┃ ")));
    }

    #[test]
    fn test_error_bubble_style() {
        let mut transcript = Transcript::new();
        let id = transcript.show_typing();
        transcript.update_text(id, "failed");
        transcript.mark_error(id);

        let lines = TranscriptRenderer::new(&transcript, 0).lines(40);
        assert_eq!(lines[1].spans[1].style.fg, Some(Theme::RED));
    }

    #[test]
    fn test_bubbles_are_separated() {
        let mut transcript = Transcript::new();
        transcript.append_message(Sender::User, Some("a"));
        transcript.append_message(Sender::Assistant, Some("b"));

        let lines = text_of(&TranscriptRenderer::new(&transcript, 0).lines(40));
        assert_eq!(lines.len(), 5);
        assert!(lines[2].is_empty());
    }

    #[test]
    fn test_window_matches_full_lines() {
        let mut transcript = Transcript::new();
        transcript.append_message(Sender::User, Some("first"));
        transcript.append_message(Sender::Assistant, Some("one two three four five six"));
        transcript.show_typing();

        let renderer = TranscriptRenderer::new(&transcript, 0);
        let full = text_of(&renderer.lines(12));
        assert_eq!(renderer.total_lines(12), full.len());

        for top in 0..full.len() {
            let window = text_of(&renderer.window(12, top, 3));
            let expected: Vec<_> = full.iter().skip(top).take(3).cloned().collect();
            assert_eq!(window, expected, "window at row {}", top);
        }
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let mut transcript = Transcript::new();
        transcript.append_message(Sender::User, Some("a"));

        let renderer = TranscriptRenderer::new(&transcript, 0);
        assert!(renderer.window(40, 10, 5).is_empty());
    }
}
