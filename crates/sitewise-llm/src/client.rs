//! HTTP client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! The client sends one request per call and never retries; callers decide
//! what a failure means for them.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_USER_AGENT: &str = "sitewise/0.1 (site-feasibility)";

/// Chat-completion client bound to one model.
///
/// Use [`LlmClient::new`] for production or [`LlmClient::with_base_url`] to
/// point at a compatible gateway or a mock server in tests.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    completions_url: Url,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("completions_url", &self.completions_url.as_str())
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a client pointed at the public `OpenAI` API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(
            api_key,
            model,
            timeout_secs,
            DEFAULT_BASE_URL,
            DEFAULT_USER_AGENT,
        )
    }

    /// Creates a client with a custom base URL and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`LlmError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash keeps `join` from replacing the last path segment
        // (`/v1` would otherwise be dropped).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let completions_url = Url::parse(&normalised)
            .and_then(|u| u.join("chat/completions"))
            .map_err(|e| LlmError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            completions_url,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `messages` and returns the first choice's text.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Timeout`] when the request exceeds the client timeout.
    /// - [`LlmError::Http`] on other transport failures.
    /// - [`LlmError::UnexpectedStatus`] on a non-2xx answer.
    /// - [`LlmError::Deserialize`] if the envelope does not parse.
    /// - [`LlmError::EmptyResponse`] if no non-empty content came back.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::from_transport)?;
        if !status.is_success() {
            return Err(LlmError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: "chat completion envelope".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    /// Sends a system + user prompt pair and returns the plain-text answer.
    ///
    /// # Errors
    ///
    /// See [`LlmClient::chat`].
    pub async fn complete_text(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        self.chat(&messages, temperature).await
    }

    /// Like [`LlmClient::complete_text`], but parses the answer as JSON.
    ///
    /// Markdown code fences around the answer are removed first. If the
    /// answer still does not parse, the outermost `{...}` span is tried.
    ///
    /// # Errors
    ///
    /// Everything [`LlmClient::chat`] returns, plus [`LlmError::Deserialize`]
    /// when the answer is not JSON.
    pub async fn complete_json(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<serde_json::Value, LlmError> {
        let content = self.complete_text(system, prompt, temperature).await?;
        parse_json_answer(&content)
    }
}

/// Removes a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
#[must_use]
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn parse_json_answer(content: &str) -> Result<serde_json::Value, LlmError> {
    let stripped = strip_code_fences(content);
    match serde_json::from_str(stripped) {
        Ok(value) => Ok(value),
        Err(err) => {
            let embedded = stripped
                .find('{')
                .zip(stripped.rfind('}'))
                .filter(|(start, end)| start < end)
                .and_then(|(start, end)| serde_json::from_str(&stripped[start..=end]).ok());
            embedded.ok_or_else(|| {
                tracing::debug!(answer = %truncate(stripped, 200), "model answer is not JSON");
                LlmError::Deserialize {
                    context: "model answer".to_string(),
                    source: err,
                }
            })
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
