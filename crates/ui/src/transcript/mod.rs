mod bubble;
mod renderer;
mod state;
mod wrap;

pub use bubble::{BubbleId, BubbleStatus, MessageBubble, Sender};
pub use renderer::{TranscriptRenderer, typing_indicator};
pub use state::Transcript;
