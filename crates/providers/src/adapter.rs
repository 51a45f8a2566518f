use eventsource_stream::Eventsource;
use futures::{StreamExt, stream::Stream};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

use crate::mock::MockProvider;
use crate::types::*;
use lumen_core::{Config, ProviderConfig, Result};

/// Generic provider trait for LLM backends
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Stream a chat completion for the whole conversation in `request`
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>>;
}

/// Gemini provider over the `streamGenerateContent` SSE endpoint
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Convert ChatRequest to Gemini API format
    fn to_gemini_request(&self, request: &ChatRequest) -> GeminiChatRequest {
        let system_instruction = request.system_instruction().map(|text| GeminiSystemInstruction {
            parts: vec![GeminiPart { text: Some(text.to_string()) }],
        });

        let contents = request
            .messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    Role::System => return None,
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                Some(GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart { text: Some(msg.content.clone()) }],
                })
            })
            .collect();

        let generation_config = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| {
            GeminiGenerationConfig { temperature: request.temperature, max_output_tokens: request.max_tokens }
        });

        GeminiChatRequest { contents, system_instruction, generation_config }
    }

    /// Parse one SSE payload. `None` means the payload carried nothing to show.
    fn parse_chunk(&self, chunk: &str) -> Option<StreamEvent> {
        if chunk.trim().is_empty() {
            return None;
        }

        let data = match serde_json::from_str::<GeminiChunk>(chunk) {
            Ok(data) => data,
            Err(_) => return Some(StreamEvent::Error(format!("Failed to parse chunk: {}", chunk))),
        };

        if let Some(error) = data.error {
            return Some(StreamEvent::Error(format!("Gemini API error: {}", error.message)));
        }

        if let Some(reason) = data.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Some(StreamEvent::Error(format!("Prompt blocked: {}", reason)));
        }

        let candidate = data.candidates.and_then(|candidates| candidates.into_iter().next())?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if !text.is_empty() {
            return Some(StreamEvent::Token(text));
        }

        match candidate.finish_reason.as_deref() {
            None | Some("STOP") | Some("MAX_TOKENS") => None,
            Some(reason) => Some(StreamEvent::Error(format!("Gemini stopped generating: {}", reason))),
        }
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn stream_chat<'a>(
        &'a self, request: ChatRequest, cancel_token: CancelToken,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamEvent> + Send + 'a>>> {
        let gemini_request = self.to_gemini_request(&request);
        let url = self.stream_url();

        tracing::debug!(model = %self.model, turns = gemini_request.contents.len(), "Opening Gemini stream");

        let stream = async_stream::stream! {
            if cancel_token.is_cancelled() {
                yield StreamEvent::Error("Cancelled before request".to_string());
                return;
            }

            let response = match self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&gemini_request)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    yield StreamEvent::Error(format!("Gemini request failed: {}", e));
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(%status, "Gemini rejected the request");
                yield StreamEvent::Error(format!("Gemini API error: {} - {}", status, body));
                return;
            }

            let eventsource = response.bytes_stream().eventsource();
            tokio::pin!(eventsource);

            while let Some(event_result) = eventsource.next().await {
                if cancel_token.is_cancelled() {
                    yield StreamEvent::Error("Cancelled by user".to_string());
                    return;
                }

                match event_result {
                    Ok(event) => match self.parse_chunk(&event.data) {
                        Some(StreamEvent::Error(message)) => {
                            yield StreamEvent::Error(message);
                            return;
                        }
                        Some(parsed) => yield parsed,
                        None => {}
                    },
                    Err(e) => {
                        yield StreamEvent::Error(format!("SSE error: {}", e));
                        return;
                    }
                }
            }

            yield StreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }
}

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChatRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// One `GenerateContentResponse` as delivered in an SSE `data:` line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChunk {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    message: String,
}

/// Factory to create providers from config
pub struct ProviderFactory;

impl ProviderFactory {
    /// Build the configured provider. Gemini fails with a configuration
    /// error when no API key can be resolved.
    pub fn create_from_config(config: &Config) -> Result<Arc<dyn Provider>> {
        match &config.provider {
            ProviderConfig::Gemini { model, base_url, .. } => {
                let api_key = config.api_key()?;
                Ok(Arc::new(GeminiProvider::new(api_key, model.clone(), Some(base_url.clone()))))
            }
            ProviderConfig::Mock { responses_file } => Ok(Arc::new(MockProvider::new(responses_file.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("test-key".to_string(), "gemini-2.5-flash".to_string(), None)
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = provider();
        assert_eq!(provider.api_key, "test-key");
        assert_eq!(provider.model(), "gemini-2.5-flash");
        assert_eq!(provider.base_url, "https://generativelanguage.googleapis.com/v1beta");
    }

    #[test]
    fn test_gemini_stream_url() {
        let provider = GeminiProvider::new(
            "test-key".to_string(),
            "gemini-2.5-flash".to_string(),
            Some("https://custom.api.com/".to_string()),
        );
        assert_eq!(
            provider.stream_url(),
            "https://custom.api.com/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
        assert!(!provider.stream_url().contains("test-key"));
    }

    #[test]
    fn test_gemini_request_conversion() {
        let request = ChatRequest::builder()
            .add_message(ChatMessage::system("You are helpful"))
            .add_message(ChatMessage::user("Hello"))
            .add_message(ChatMessage::assistant("Hi!"))
            .add_message(ChatMessage::user("How are you?"))
            .build();

        let gem_req = provider().to_gemini_request(&request);
        assert_eq!(gem_req.contents.len(), 3);
        assert_eq!(gem_req.contents[0].role.as_deref(), Some("user"));
        assert_eq!(gem_req.contents[1].role.as_deref(), Some("model"));
        assert_eq!(gem_req.contents[2].parts[0].text.as_deref(), Some("How are you?"));
        assert_eq!(
            gem_req.system_instruction.as_ref().unwrap().parts[0].text.as_deref(),
            Some("You are helpful")
        );
        assert!(gem_req.generation_config.is_none());
    }

    #[test]
    fn test_gemini_request_json_shape() {
        let request = ChatRequest::builder()
            .add_message(ChatMessage::system("Be brief"))
            .add_message(ChatMessage::user("Hello"))
            .max_tokens(Some(8192))
            .build();

        let json = serde_json::to_value(provider().to_gemini_request(&request)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_parse_chunk_text() {
        let chunk = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(provider().parse_chunk(chunk), Some(StreamEvent::Token("Hello".to_string())));
    }

    #[test]
    fn test_parse_chunk_final_without_text() {
        let chunk = r#"{"candidates":[{"content":{"role":"model","parts":[]},"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert_eq!(provider().parse_chunk(chunk), None);
        assert_eq!(provider().parse_chunk("  "), None);
    }

    #[test]
    fn test_parse_chunk_safety_stop() {
        let chunk = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        assert!(matches!(provider().parse_chunk(chunk), Some(StreamEvent::Error(msg)) if msg.contains("SAFETY")));
    }

    #[test]
    fn test_parse_chunk_blocked_prompt() {
        let chunk = r#"{"promptFeedback":{"blockReason":"OTHER"}}"#;
        assert!(matches!(provider().parse_chunk(chunk), Some(StreamEvent::Error(msg)) if msg.contains("OTHER")));
    }

    #[test]
    fn test_parse_chunk_api_error() {
        let chunk = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(provider().parse_chunk(chunk), Some(StreamEvent::Error(msg)) if msg.contains("exhausted")));
    }

    #[test]
    fn test_parse_chunk_invalid_json() {
        assert!(matches!(provider().parse_chunk("{not json"), Some(StreamEvent::Error(_))));
    }

    #[tokio::test]
    async fn test_stream_reports_connection_failure() {
        let provider = GeminiProvider::new(
            "test-key".to_string(),
            "gemini-2.5-flash".to_string(),
            Some("http://127.0.0.1:1".to_string()),
        );
        let request = ChatRequest::builder().add_message(ChatMessage::user("Hello")).build();

        let mut stream = provider.stream_chat(request, CancelToken::new()).await.unwrap();
        let event = stream.next().await;
        assert!(matches!(event, Some(StreamEvent::Error(msg)) if msg.starts_with("Gemini request failed")));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_cancelled_before_request() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let provider = provider();
        let mut stream = provider.stream_chat(ChatRequest::default(), cancel).await.unwrap();
        assert_eq!(stream.next().await, Some(StreamEvent::Error("Cancelled before request".to_string())));
    }

    #[test]
    fn test_factory_requires_api_key_for_gemini() {
        let mut config = Config::default();
        if let ProviderConfig::Gemini { api_key, .. } = &mut config.provider {
            *api_key = Some("from-file".to_string());
        }
        assert!(ProviderFactory::create_from_config(&config).is_ok());
    }

    #[test]
    fn test_factory_builds_mock_without_key() {
        let config = Config { provider: ProviderConfig::Mock { responses_file: None }, ..Default::default() };
        assert!(ProviderFactory::create_from_config(&config).is_ok());
    }
}
