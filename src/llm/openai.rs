//! OpenAI-compatible `/chat/completions` client.
//!
//! Serves both the hosted aggregator (session token, `{api_url}/api/ai`) and
//! the direct API-key provider.  All connection details come from the
//! caller; nothing is hardcoded here.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::completion::{ChatMessage, CompletionParams, CompletionProvider, LlmError};

/// Calls an OpenAI-compatible `{base_url}/chat/completions` endpoint.
pub struct OpenAiCompatible {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatible {
    /// `base_url` is the API root (e.g. `https://api.openai.com/v1`); the
    /// conversation's own `baseUrl`, when forwarded, takes precedence.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, params: &CompletionParams) -> String {
        let base = params.base_url.as_deref().unwrap_or(&self.base_url);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

/// JSON body for a non-streaming chat-completion request.
///
/// Parameters that are `None` are omitted so the backend default applies.
pub(crate) fn request_body(context: &[ChatMessage], params: &CompletionParams) -> Value {
    let mut body = json!({
        "model":    params.model,
        "messages": context,
        "stream":   false,
    });

    let optional = [
        ("temperature", params.temperature.map(Value::from)),
        ("max_tokens", params.max_tokens.map(Value::from)),
        ("frequency_penalty", params.frequency_penalty.map(Value::from)),
        ("presence_penalty", params.presence_penalty.map(Value::from)),
        ("n", params.number_of_choices.map(Value::from)),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            body[key] = value;
        }
    }
    body
}

/// Extract the text of every choice, in order.
///
/// Choices with empty content are skipped; if nothing is left the response
/// counts as empty.
pub(crate) fn parse_choices(json: &Value) -> Result<Vec<String>, LlmError> {
    let choices = json["choices"]
        .as_array()
        .ok_or_else(|| LlmError::Parse("missing `choices` array".into()))?;

    let texts: Vec<String> = choices
        .iter()
        .filter_map(|choice| choice["message"]["content"].as_str())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if texts.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(texts)
}

#[async_trait]
impl CompletionProvider for OpenAiCompatible {
    async fn complete(
        &self,
        context: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Vec<String>, LlmError> {
        let url = self.endpoint(params);
        log::debug!("llm: POST {url} (model={}, messages={})", params.model, context.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body(context, params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parse_choices(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
