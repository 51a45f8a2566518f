pub mod adapter;
pub mod mock;
pub mod types;

pub use adapter::{GeminiProvider, Provider, ProviderFactory};
pub use mock::{MockEvent, MockProvider, MockResponse};
pub use types::{CancelToken, ChatMessage, ChatRequest, ChatRequestBuilder, Role, StreamEvent};

pub use lumen_core::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest::builder()
            .messages(vec![ChatMessage::system("System message"), ChatMessage::user("Hi")])
            .build();

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("system"));
        assert!(json.contains("Hi"));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn test_stream_event_variants() {
        let token_event = StreamEvent::Token("Hello".to_string());
        let done_event = StreamEvent::Done;
        let error_event = StreamEvent::Error("Connection failed".to_string());

        assert!(matches!(token_event, StreamEvent::Token(_)));
        assert!(matches!(done_event, StreamEvent::Done));
        assert!(matches!(error_event, StreamEvent::Error(_)));
    }

    #[test]
    fn test_provider_is_object_safe() {
        let provider: std::sync::Arc<dyn Provider> = std::sync::Arc::new(MockProvider::new(None));
        assert_eq!(std::sync::Arc::strong_count(&provider), 1);
    }
}
