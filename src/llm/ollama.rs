//! Native Ollama `/api/chat` client for the self-hosted profile.
//!
//! Ollama produces a single choice per call, so `number_of_choices` is never
//! part of its configurable fields.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::llm::completion::{ChatMessage, CompletionParams, CompletionProvider, LlmError};

pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaChat {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, params: &CompletionParams) -> String {
        let base = params.base_url.as_deref().unwrap_or(&self.base_url);
        format!("{}/api/chat", base.trim_end_matches('/'))
    }
}

pub(crate) fn request_body(context: &[ChatMessage], params: &CompletionParams) -> Value {
    let mut options = Map::new();
    if let Some(t) = params.temperature {
        options.insert("temperature".into(), t.into());
    }
    if let Some(n) = params.max_tokens {
        options.insert("num_predict".into(), n.into());
    }
    if let Some(p) = params.frequency_penalty {
        options.insert("frequency_penalty".into(), p.into());
    }
    if let Some(p) = params.presence_penalty {
        options.insert("presence_penalty".into(), p.into());
    }

    json!({
        "model":    params.model,
        "messages": context,
        "stream":   false,
        "options":  options,
    })
}

pub(crate) fn parse_reply(json: &Value) -> Result<Vec<String>, LlmError> {
    let content = json["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::Parse("missing `message.content`".into()))?
        .trim();

    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(vec![content.to_string()])
}

#[async_trait]
impl CompletionProvider for OllamaChat {
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

        parse_reply(&json)
    }
}
