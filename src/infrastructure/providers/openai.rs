use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::application::ports::{
    CredentialStore, ProviderAdapter, ProviderError, TranscriptionPayload, TranscriptionResult,
};
use crate::domain::TranscriptionProvider;

use super::mappers::map_openai_response;

const DEFAULT_MODEL: &str = "whisper-1";

pub struct OpenAiAdapter {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl OpenAiAdapter {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    fn request_body(payload: &TranscriptionPayload) -> Value {
        let mut body = Map::new();
        body.insert("file".to_string(), json!(payload.file_url));
        body.insert(
            "model".to_string(),
            json!(payload.model.as_deref().unwrap_or(DEFAULT_MODEL)),
        );
        if let Some(prompt) = &payload.prompt {
            body.insert("prompt".to_string(), json!(prompt));
        }
        body.insert("response_format".to_string(), json!("verbose_json"));
        body.insert("temperature".to_string(), json!(0));
        if let Some(language) = &payload.language {
            body.insert("language".to_string(), json!(language));
        }
        body.insert("diarization".to_string(), json!(true));
        if let Some(extra) = &payload.additional_config {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }
        Value::Object(body)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn id(&self) -> TranscriptionProvider {
        TranscriptionProvider::OpenAi
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["gpt-4o-transcribe".to_string(), "whisper-1".to_string()])
    }

    async fn transcribe(
        &self,
        payload: TranscriptionPayload,
    ) -> Result<TranscriptionResult, ProviderError> {
        let api_key = self
            .credentials
            .decrypted_key(payload.user_id, self.id())
            .await?;

        let url = format!("{}/audio/transcriptions", self.base_url);
        let body = Self::request_body(&payload);

        tracing::debug!(url = %url, "Submitting audio to OpenAI");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
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

        map_openai_response(&raw)
            .map_err(|e| ProviderError::InvalidResponse(self.id(), e.to_string()))
    }
}
