use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::application::ports::{
    CredentialStore, ProviderAdapter, ProviderError, TranscriptionPayload, TranscriptionResult,
};
use crate::domain::TranscriptionProvider;

use super::mappers::map_deepgram_response;

const DEFAULT_MODEL: &str = "nova-3-general";

pub struct DeepgramAdapter {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl DeepgramAdapter {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn request_body(payload: &TranscriptionPayload) -> Value {
        let mut body = Map::new();
        body.insert("url".to_string(), json!(payload.file_url));
        body.insert(
            "model".to_string(),
            json!(payload.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        body.insert("diarize".to_string(), json!(payload.diarize));
        body.insert("smart_format".to_string(), json!(true));
        body.insert("utterances".to_string(), json!(true));
        body.insert("paragraphs".to_string(), json!(true));
        body.insert(
            "detect_language".to_string(),
            json!(payload.language.is_none()),
        );
        if let Some(language) = &payload.language {
            body.insert("language".to_string(), json!(language));
        }
        if let Some(prompt) = &payload.prompt {
            body.insert("prompt".to_string(), json!(prompt));
        }
        // Caller-supplied options win over everything above.
        if let Some(extra) = &payload.additional_config {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }
        Value::Object(body)
    }
}

#[async_trait]
impl ProviderAdapter for DeepgramAdapter {
    fn id(&self) -> TranscriptionProvider {
        TranscriptionProvider::Deepgram
    }

    // Deepgram exposes no live models endpoint worth polling; this list
    // changes rarely.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![
            "nova-3-general".to_string(),
            "nova-3-meeting".to_string(),
            "nova-3-telehealth".to_string(),
        ])
    }

    async fn transcribe(
        &self,
        payload: TranscriptionPayload,
    ) -> Result<TranscriptionResult, ProviderError> {
        let api_key = self
            .credentials
            .decrypted_key(payload.user_id, self.id())
            .await?;

        let url = format!("{}/v1/listen", self.base_url);
        let body = Self::request_body(&payload);

        tracing::debug!(url = %url, "Submitting audio to Deepgram");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(self.id(), e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ProviderError::Api {
                provider: self.id(),
                status,
                body,
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(self.id(), e.to_string()))?;

        map_deepgram_response(&raw)
            .map_err(|e| ProviderError::InvalidResponse(self.id(), e.to_string()))
    }
}
