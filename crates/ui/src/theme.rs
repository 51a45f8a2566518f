use ratatui::style::{Color, Modifier, Style};

use crate::transcript::{BubbleStatus, Sender};

/// Lumen's fixed dark theme
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Primary background: deep blue-black (fills terminal)
    pub const BG: Color = Color::Rgb(16, 18, 28);

    /// Foreground: light blue-gray (primary text)
    pub const FG: Color = Color::Rgb(205, 210, 225);

    /// Secondary background: panels, cards, input
    pub const PANEL_BG: Color = Color::Rgb(28, 31, 48);

    /// User accent
    pub const BLUE: Color = Color::Rgb(120, 160, 240);

    /// Assistant accent
    pub const CYAN: Color = Color::Rgb(110, 210, 225);

    pub const PURPLE: Color = Color::Rgb(170, 140, 230);

    pub const GREEN: Color = Color::Rgb(150, 210, 140);

    pub const RED: Color = Color::Rgb(235, 110, 120);

    /// Muted text: timestamps, hints, placeholders
    pub const MUTED: Color = Color::Rgb(100, 108, 135);

    pub const BORDER: Color = Color::Rgb(58, 64, 92);

    /// Base style for all text
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    pub fn panel() -> Style {
        Style::default().fg(Self::FG).bg(Self::PANEL_BG)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::RED).bg(Self::BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn title() -> Style {
        Style::default().fg(Self::CYAN).add_modifier(Modifier::BOLD)
    }

    /// Accent bar color of a bubble
    pub fn bubble_accent(sender: Sender, status: BubbleStatus) -> Color {
        match (sender, status) {
            (_, BubbleStatus::Error) => Self::RED,
            (Sender::User, _) => Self::BLUE,
            (Sender::Assistant, _) => Self::CYAN,
        }
    }

    /// Style of a bubble's body text
    pub fn bubble_text(status: BubbleStatus) -> Style {
        match status {
            BubbleStatus::Error => Self::error(),
            BubbleStatus::Loading => Self::muted(),
            BubbleStatus::Normal => Self::base(),
        }
    }
}
