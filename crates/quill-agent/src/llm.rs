use std::time::Duration;

use async_trait::async_trait;
use quill_core::{ChatModel, ChatRequest, LlmConfig, QuillError};

/// Default inference endpoint (Hugging Face router, OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint:
/// the Hugging Face router, OpenAI, Ollama, vLLM, etc.
///
/// # Examples
///
/// ```
/// use quill_core::{ChatModel, LlmConfig};
/// use quill_agent::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("hf_test".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config, "mistralai/Mistral-7B-Instruct-v0.3").unwrap();
/// assert_eq!(client.model(), "mistralai/Mistral-7B-Instruct-v0.3");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    /// Create a client for `model` from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, model: impl Into<String>) -> Result<Self, QuillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| QuillError::Llm(format!("failed to create HTTP client: {e}")))?;
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            model: model.into(),
        })
    }

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request and return the text response.
    ///
    /// Posts to `{base_url}/v1/chat/completions` and reads the first choice.
    async fn chat(&self, request: &ChatRequest) -> Result<String, QuillError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!(
            %url,
            model = %self.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "sending chat completion"
        );

        let mut builder = self.client.post(&url);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }
        builder = builder.header("Content-Type", "application/json");

        let response = builder
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| QuillError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QuillError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QuillError::Llm(format!("failed to parse response: {e}")))?;

        first_choice_content(&response_body)
    }
}

/// Content of the first choice in a chat completion response body.
///
/// # Errors
///
/// Returns [`QuillError::Llm`] when the body has no textual first choice.
pub fn first_choice_content(body: &serde_json::Value) -> Result<String, QuillError> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| QuillError::Llm(format!("unexpected response structure: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_succeeds() {
        let client = LlmClient::new(&LlmConfig::default(), "m");
        assert!(client.is_ok());
    }

    #[test]
    fn base_url_defaults_and_trims() {
        let client = LlmClient::new(&LlmConfig::default(), "m").unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);

        let config = LlmConfig {
            base_url: Some("http://localhost:11434/".into()),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config, "m").unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn request_body_carries_sampling_parameters() {
        let client = LlmClient::new(&LlmConfig::default(), "deepseek").unwrap();
        let body = client.request_body(&ChatRequest::single("hi", 600, 0.5));
        assert_eq!(body["model"], "deepseek");
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn reports_model_it_was_built_for() {
        let config = LlmConfig::default();
        let client = LlmClient::new(&config, config.reviewer_model.clone()).unwrap();
        assert_eq!(client.model(), "deepseek-ai/DeepSeek-V3-0324");
        assert_eq!(client.request_body(&ChatRequest::single("x", 1, 0.0))["model"], client.model());
    }

    #[test]
    fn reads_first_choice_only() {
        let body = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(first_choice_content(&body).unwrap(), "first");
    }

    #[test]
    fn missing_choices_is_an_error() {
        let body = serde_json::json!({"error": "overloaded"});
        assert!(matches!(
            first_choice_content(&body),
            Err(QuillError::Llm(_))
        ));

        let body = serde_json::json!({"choices": [{"message": {"content": null}}]});
        assert!(first_choice_content(&body).is_err());
    }
}
