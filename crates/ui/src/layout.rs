use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Composer rows shown at most, excluding the hint line
const MAX_INPUT_ROWS: u16 = 6;

/// Calculated layout for the chat view
#[derive(Debug, Clone)]
pub struct ChatLayout {
    /// Header area (1 line)
    pub header: Rect,
    /// Main transcript area
    pub transcript: Rect,
    /// Composer card: accent bar, input rows and the hint line
    pub footer: Rect,
}

impl ChatLayout {
    /// Split `area`, growing the composer with the number of input lines
    pub fn calculate(area: Rect, input_lines: usize) -> Self {
        let input_rows = u16::try_from(input_lines.max(1)).unwrap_or(MAX_INPUT_ROWS).min(MAX_INPUT_ROWS);
        let footer_height = input_rows + 3;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(footer_height)])
            .split(area);

        Self { header: chunks[0], transcript: chunks[1], footer: chunks[2] }
    }
}

/// Rect of the given size centered in `area`, clamped to fit
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Shrink `area` by the given horizontal and vertical padding
pub fn inset_area(area: Rect, pad_x: u16, pad_y: u16) -> Rect {
    Rect {
        x: area.x.saturating_add(pad_x),
        y: area.y.saturating_add(pad_y),
        width: area.width.saturating_sub(pad_x.saturating_mul(2)),
        height: area.height.saturating_sub(pad_y.saturating_mul(2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_layout() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = ChatLayout::calculate(area, 1);

        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.height, 4);
        assert_eq!(layout.transcript.height, 19);
        assert_eq!(layout.footer.y + layout.footer.height, 24);
    }

    #[test]
    fn test_footer_grows_with_input() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(ChatLayout::calculate(area, 3).footer.height, 6);
        assert_eq!(ChatLayout::calculate(area, 50).footer.height, MAX_INPUT_ROWS + 3);
    }

    #[test]
    fn test_huge_paste_keeps_full_footer() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(ChatLayout::calculate(area, 65_536).footer.height, MAX_INPUT_ROWS + 3);
        assert_eq!(ChatLayout::calculate(area, usize::MAX).footer.height, MAX_INPUT_ROWS + 3);
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(area, 40, 10);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 10);
        assert_eq!(rect.x, 30);
        assert_eq!(rect.y, 15);

        let clamped = centered_rect(Rect::new(0, 0, 20, 5), 40, 10);
        assert_eq!((clamped.width, clamped.height), (20, 5));
    }

    #[test]
    fn test_inset_area() {
        let inner = inset_area(Rect::new(2, 2, 10, 6), 1, 1);
        assert_eq!(inner, Rect::new(3, 3, 8, 4));
        assert_eq!(inset_area(Rect::new(0, 0, 1, 1), 2, 2).width, 0);
    }
}
