use chrono::{DateTime, Local};

/// Who authored a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Lumen",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Sender::User => "●",
            Sender::Assistant => "◆",
        }
    }
}

/// Display state of a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BubbleStatus {
    #[default]
    Normal,
    /// Typing indicator; no content yet
    Loading,
    Error,
}

/// Index of a bubble in its transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BubbleId(pub(crate) usize);

/// One transcript entry
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBubble {
    pub sender: Sender,
    pub content: String,
    pub status: BubbleStatus,
    pub created_at: DateTime<Local>,
}

impl MessageBubble {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self { sender, content: content.into(), status: BubbleStatus::Normal, created_at: Local::now() }
    }

    pub fn typing() -> Self {
        Self { status: BubbleStatus::Loading, ..Self::new(Sender::Assistant, "") }
    }

    pub fn is_loading(&self) -> bool {
        self.status == BubbleStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == BubbleStatus::Error
    }

    /// `HH:MM` creation time shown in the bubble header
    pub fn timestamp(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}
