use super::bubble::{BubbleId, BubbleStatus, MessageBubble, Sender};
use super::wrap::WrapCache;

use std::rc::Rc;

/// Conversation shown in the chat view
///
/// Bubbles are never removed, so a [`BubbleId`] stays valid for the life of
/// the transcript. Scrolling is measured in rendered lines from the bottom;
/// an offset of zero follows new content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    bubbles: Vec<MessageBubble>,
    scroll_offset: usize,
    wrap_cache: WrapCache,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bubble and follow it. Without text the bubble starts empty.
    pub fn append_message(&mut self, sender: Sender, text: Option<&str>) -> BubbleId {
        self.push(MessageBubble::new(sender, text.unwrap_or_default()))
    }

    /// Append an assistant bubble showing the typing indicator
    pub fn show_typing(&mut self) -> BubbleId {
        self.push(MessageBubble::typing())
    }

    /// Overwrite a bubble's text and clear its loading state
    pub fn update_text(&mut self, id: BubbleId, text: &str) {
        let Some(bubble) = self.bubbles.get_mut(id.0) else {
            tracing::warn!(bubble = id.0, "update for unknown bubble");
            return;
        };
        bubble.content.clear();
        bubble.content.push_str(text);
        if bubble.status == BubbleStatus::Loading {
            bubble.status = BubbleStatus::Normal;
        }
        self.wrap_cache.invalidate(id.0);
        self.scroll_to_bottom();
    }

    /// Show a bubble as failed
    pub fn mark_error(&mut self, id: BubbleId) {
        if let Some(bubble) = self.bubbles.get_mut(id.0) {
            bubble.status = BubbleStatus::Error;
        }
    }

    /// Settle a bubble that is still loading (reply completed without text)
    pub fn finish(&mut self, id: BubbleId) {
        if let Some(bubble) = self.bubbles.get_mut(id.0)
            && bubble.status == BubbleStatus::Loading
        {
            bubble.status = BubbleStatus::Normal;
        }
    }

    pub fn get(&self, id: BubbleId) -> Option<&MessageBubble> {
        self.bubbles.get(id.0)
    }

    /// Body text of the bubble at `index` wrapped to `width`, cached until the text changes
    pub(crate) fn wrapped_body(&self, index: usize, width: usize) -> Option<Rc<[String]>> {
        let bubble = self.bubbles.get(index)?;
        Some(self.wrap_cache.body(index, bubble, width))
    }

    pub fn bubbles(&self) -> &[MessageBubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn last(&self) -> Option<&MessageBubble> {
        self.bubbles.last()
    }

    /// Number of bubbles from the given sender
    pub fn count_from(&self, sender: Sender) -> usize {
        self.bubbles.iter().filter(|b| b.sender == sender).count()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Scroll towards older content; the renderer clamps to the top
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset == 0
    }

    fn push(&mut self, bubble: MessageBubble) -> BubbleId {
        self.bubbles.push(bubble);
        self.scroll_to_bottom();
        BubbleId(self.bubbles.len() - 1)
    }
}
