use chrono::{DateTime, Local};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::reply::ReplyStream;
use lumen_core::logging::{PrivacyConfig, redact_content};
use lumen_core::{Config, Error, Result};
use lumen_providers::{CancelToken, ChatMessage, ChatRequest, Provider, StreamEvent};

/// Fixed parameters a session is created with
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Model label, for logs and status output
    pub model: String,
    pub system_instruction: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub privacy: PrivacyConfig,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        let logging = lumen_core::logging::LoggingConfig::from(config.logging.clone());
        Self {
            model: config.provider.model().to_string(),
            system_instruction: config.assistant.system_instruction.clone(),
            temperature: config.assistant.temperature,
            max_output_tokens: config.assistant.max_output_tokens,
            privacy: logging.privacy,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Handle to one remote conversation.
///
/// Gemini's REST API is stateless, so the handle carries the committed
/// history and replays it with every turn.
#[derive(Debug)]
pub struct ChatSession {
    created_at: DateTime<Local>,
    settings: SessionSettings,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ChatSession {
    fn new(settings: SessionSettings) -> Self {
        Self { created_at: Local::now(), settings, messages: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.settings.system_instruction
    }

    /// Committed user and assistant turns, oldest first
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.lock().map(|messages| messages.clone()).unwrap_or_default()
    }

    fn build_request(&self, user_input: &str) -> ChatRequest {
        let mut messages = vec![ChatMessage::system(self.settings.system_instruction.clone())];
        messages.extend(self.history());
        messages.push(ChatMessage::user(user_input));

        ChatRequest::builder()
            .messages(messages)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_output_tokens)
            .build()
    }
}

/// Owns the single chat session for the lifetime of the application
pub struct ChatSessionManager {
    provider: Arc<dyn Provider>,
    settings: SessionSettings,
    session: Option<ChatSession>,
    in_flight: Arc<AtomicBool>,
    cancel_token: Option<CancelToken>,
}

impl ChatSessionManager {
    pub fn new(provider: Arc<dyn Provider>, settings: SessionSettings) -> Self {
        Self { provider, settings, session: None, in_flight: Arc::new(AtomicBool::new(false)), cancel_token: None }
    }

    /// Create the session on first use. Later calls return the same session.
    pub fn ensure_session(&mut self) -> &ChatSession {
        let settings = &self.settings;
        self.session.get_or_insert_with(|| {
            tracing::info!(model = %settings.model, "Chat session created");
            ChatSession::new(settings.clone())
        })
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a reply is currently streaming
    pub fn is_streaming(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send a user turn and stream the assistant's reply.
    ///
    /// Remote failures arrive through the stream as `Error::Provider`. The
    /// turn is committed to the history only if the reply completes.
    pub fn send_and_stream(&mut self, message: &str) -> Result<ReplyStream> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(Error::Other("a reply is already streaming".to_string()));
        }

        let privacy = self.settings.privacy.clone();
        let session = self.ensure_session();
        let request = session.build_request(message);
        let history = Arc::clone(&session.messages);

        tracing::debug!(
            content = %redact_content(message, &privacy),
            turns = request.messages.len(),
            "Sending user turn"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel_token = CancelToken::new();
        self.cancel_token = Some(cancel_token.clone());

        let provider = Arc::clone(&self.provider);
        let in_flight = Arc::clone(&self.in_flight);
        let user_message = message.to_string();

        tokio::spawn(async move {
            let stream = match provider.stream_chat(request, cancel_token).await {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "Provider refused the request");
                    in_flight.store(false, Ordering::SeqCst);
                    let _ = tx.send(Err(into_provider_error(e)));
                    return;
                }
            };

            tokio::pin!(stream);

            let mut reply = String::new();
            let mut outcome = None;

            while let Some(event) = stream.next().await {
                match event {
                    StreamEvent::Token(text) => {
                        reply.push_str(&text);
                        if tx.send(Ok(text)).is_err() {
                            outcome = Some(Err("reply receiver dropped".to_string()));
                            break;
                        }
                    }
                    StreamEvent::Done => {
                        outcome = Some(Ok(()));
                        break;
                    }
                    StreamEvent::Error(msg) => {
                        outcome = Some(Err(msg));
                        break;
                    }
                }
            }

            match outcome.unwrap_or_else(|| Err("stream ended before completion".to_string())) {
                Ok(()) => {
                    tracing::debug!(
                        content = %redact_content(&reply, &privacy),
                        chars = reply.chars().count(),
                        "Reply complete"
                    );
                    if let Ok(mut messages) = history.lock() {
                        messages.push(ChatMessage::user(user_message));
                        messages.push(ChatMessage::assistant(reply));
                    }
                    in_flight.store(false, Ordering::SeqCst);
                }
                Err(msg) => {
                    tracing::warn!(error = %msg, "Reply failed");
                    in_flight.store(false, Ordering::SeqCst);
                    let _ = tx.send(Err(Error::Provider(msg)));
                }
            }
        });

        Ok(ReplyStream::new(rx))
    }

    /// Stop the reply currently streaming, if any
    pub fn cancel(&self) {
        if let Some(token) = &self.cancel_token {
            token.cancel();
        }
    }
}

fn into_provider_error(err: Error) -> Error {
    match err {
        Error::Provider(_) => err,
        other => Error::Provider(other.to_string()),
    }
}
