use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::application::ports::{
    CredentialStore, ProviderAdapter, ProviderError, TranscriptionPayload, TranscriptionResult,
};
use crate::domain::TranscriptionProvider;

use super::mappers::map_elevenlabs_response;

const DEFAULT_MODEL: &str = "scribe_v1";

pub struct ElevenLabsAdapter {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ElevenLabsAdapter {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn request_body(payload: &TranscriptionPayload) -> Value {
        let mut body = Map::new();
        body.insert("diarize".to_string(), json!(payload.diarize));
        body.insert(
            "model_id".to_string(),
            json!(payload.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        body.insert("audio_url".to_string(), json!(payload.file_url));
        if let Some(language) = &payload.language {
            body.insert("language_code".to_string(), json!(language));
        }
        if let Some(prompt) = &payload.prompt {
            body.insert("prompt".to_string(), json!(prompt));
        }
        if let Some(extra) = &payload.additional_config {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }
        Value::Object(body)
    }
}

#[async_trait]
impl ProviderAdapter for ElevenLabsAdapter {
    fn id(&self) -> TranscriptionProvider {
        TranscriptionProvider::ElevenLabs
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["scribe_v1".to_string()])
    }

    async fn transcribe(
        &self,
        payload: TranscriptionPayload,
    ) -> Result<TranscriptionResult, ProviderError> {
        let api_key = self
            .credentials
            .decrypted_key(payload.user_id, self.id())
            .await?;

        let url = format!("{}/v1/speech-to-text/recognize", self.base_url);
        let body = Self::request_body(&payload);

        tracing::debug!(url = %url, "Submitting audio to ElevenLabs");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
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

        map_elevenlabs_response(&raw)
            .map_err(|e| ProviderError::InvalidResponse(self.id(), e.to_string()))
    }
}
