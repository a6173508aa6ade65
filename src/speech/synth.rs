//! Remote speech synthesis.

use async_trait::async_trait;

use crate::config::AzureConfig;
use crate::speech::SpeechError;

/// Turns an SSML document into encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Azure Cognitive Services text-to-speech REST endpoint.
pub struct AzureSynthesizer {
    client: reqwest::Client,
    key: Option<String>,
    region: Option<String>,
    output_format: String,
}

impl AzureSynthesizer {
    pub fn new(client: reqwest::Client, config: &AzureConfig) -> Self {
        Self {
            client,
            key: config.key.clone(),
            region: config.region.clone(),
            output_format: config.output_format.clone(),
        }
    }

    /// Regional REST endpoint, once a region is configured.
    pub fn endpoint(&self) -> Option<String> {
        self.region
            .as_deref()
            .filter(|region| !region.is_empty())
            .map(|region| format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"))
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, SpeechError> {
        let key = self
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(SpeechError::MissingCredentials)?;
        let url = self.endpoint().ok_or(SpeechError::MissingCredentials)?;
        log::debug!("speech: POST {url} ({} bytes of SSML)", ssml.len());

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.output_format)
            .body(ssml.to_string())
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;
        log::info!("speech: synthesised {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_regional() {
        let config = AzureConfig {
            key: Some("k".into()),
            region: Some("westeurope".into()),
            ..AzureConfig::default()
        };
        let synth = AzureSynthesizer::new(reqwest::Client::new(), &config);
        assert_eq!(
            synth.endpoint().as_deref(),
            Some("https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1")
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let synth = AzureSynthesizer::new(reqwest::Client::new(), &AzureConfig::default());
        assert!(matches!(
            synth.synthesize("<speak/>").await,
            Err(SpeechError::MissingCredentials)
        ));
    }
}
