//! Chat Session Manager: a single lazily created conversation with the
//! configured model, exposing "send a turn, receive a streamed reply".

pub mod manager;
pub mod reply;

pub use manager::{ChatSession, ChatSessionManager, SessionSettings};
pub use reply::ReplyStream;
