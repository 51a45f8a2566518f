use crate::Provider;
use crate::types::*;
use lumen_core::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_stream::Stream;

/// Mock response types for deterministic testing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    /// Streamed word by word
    Text { content: String },
    Error { message: String },
    Sequence { events: Vec<MockEvent> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MockEvent {
    Token { text: String },
    Error { message: String },
    Done,
}

/// Mock configuration from TOML file
#[derive(Debug, Deserialize)]
struct MockConfig {
    /// Pause between streamed fragments
    #[serde(default)]
    delay_ms: u64,
    responses: Vec<MockResponse>,
}

/// Mock provider for offline runs and deterministic tests
pub struct MockProvider {
    responses: Vec<MockResponse>,
    current: Arc<AtomicUsize>,
    delay: Duration,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(responses_file: Option<PathBuf>) -> Self {
        match responses_file {
            Some(path) => Self::load_responses(&path),
            None => Self::from_responses(vec![MockResponse::Text {
                content: "Mock response - configure responses_file in config".to_string(),
            }]),
        }
    }

    pub fn from_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            responses,
            current: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    fn load_responses(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Mock responses file not found: {}", path.display());
            return Self::from_responses(vec![MockResponse::Text {
                content: format!("Mock responses file not found: {}", path.display()),
            }]);
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<MockConfig>(&content) {
                Ok(config) => Self::from_responses(config.responses).with_delay(Duration::from_millis(config.delay_ms)),
                Err(e) => {
                    tracing::error!("Failed to parse mock responses: {}", e);
                    Self::from_responses(vec![MockResponse::Error {
                        message: format!("Failed to parse mock responses: {}", e),
                    }])
                }
            },
            Err(e) => {
                tracing::error!("Failed to read mock responses file: {}", e);
                Self::from_responses(vec![MockResponse::Error {
                    message: format!("Failed to read mock responses file: {}", e),
                }])
            }
        }
    }

    fn get_next_response(&self) -> MockResponse {
        let index = self.current.fetch_add(1, Ordering::SeqCst);
        if index < self.responses.len() {
            self.responses[index].clone()
        } else {
            MockResponse::Text {
                content: format!(
                    "No more mock responses configured (requested: {}, available: {})",
                    index + 1,
                    self.responses.len()
                ),
            }
        }
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let response = self.get_next_response();
        let delay = self.delay;

        let events: Vec<StreamEvent> = match response {
            MockResponse::Text { content } => content
                .split_inclusive(' ')
                .map(|word| StreamEvent::Token(word.to_string()))
                .chain(std::iter::once(StreamEvent::Done))
                .collect(),
            MockResponse::Error { message } => vec![StreamEvent::Error(message)],
            MockResponse::Sequence { events } => {
                let mut converted = Vec::with_capacity(events.len() + 1);
                for event in events {
                    match event {
                        MockEvent::Token { text } => converted.push(StreamEvent::Token(text)),
                        MockEvent::Error { message } => {
                            converted.push(StreamEvent::Error(message));
                            break;
                        }
                        MockEvent::Done => break,
                    }
                }
                if !matches!(converted.last(), Some(StreamEvent::Error(_))) {
                    converted.push(StreamEvent::Done);
                }
                converted
            }
        };

        let stream = async_stream::stream! {
            for event in events {
                if cancel_token.is_cancelled() {
                    yield StreamEvent::Error("Cancelled by user".to_string());
                    return;
                }
                if !delay.is_zero() && matches!(event, StreamEvent::Token(_)) {
                    tokio::time::sleep(delay).await;
                }
                yield event;
            }
        };

        Ok(Box::pin(stream))
    }
}
