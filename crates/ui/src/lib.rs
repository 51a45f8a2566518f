//! Terminal chat front end for Lumen.
//!
//! [`App`] drives the login screen, the streamed chat transcript and voice
//! dictation; [`app::run`] owns the terminal and the event loop.

pub mod app;
pub mod components;
pub mod event_handler;
pub mod layout;
pub mod state;
pub mod theme;
pub mod transcript;

pub use app::{App, AppSettings, ERROR_TEXT, TurnUpdate, run};
pub use event_handler::{EventHandler, KeyAction};
pub use state::{AppState, Controls, InputState, LoginState, View};
pub use theme::Theme;
pub use transcript::{BubbleId, BubbleStatus, MessageBubble, Sender, Transcript, TranscriptRenderer};
