use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::application::ports::{
    AudioAssetRepository, CompletedTranscript, MetadataPatch, ProviderError, RepositoryError,
    SegmentDraft, SpeakerDraft, TranscriptionDetail, TranscriptionPayload,
    TranscriptionRepository, TranscriptionResult,
};
use crate::domain::{
    AudioAsset, AudioAssetId, Speaker, SpeakerId, Transcription, TranscriptionId,
    TranscriptionProvider, UserId,
};

use super::ProviderRegistry;

#[derive(Debug, Clone)]
pub struct CreateTranscriptionInput {
    pub user_id: UserId,
    pub audio_asset_id: AudioAssetId,
    pub provider: TranscriptionProvider,
    pub model: Option<String>,
    pub prompt_template: Option<String>,
    pub custom_prompt: Option<String>,
    pub language: Option<String>,
    pub diarize: Option<bool>,
    pub additional_config: Option<Map<String, Value>>,
}

/// Drives a transcription job through its lifecycle:
/// `Pending -> Processing -> Completed | Failed`.
///
/// This is the only place that turns adapter or persistence failures into a
/// persisted `Failed` state; adapters and mappers only raise.
pub struct TranscriptionService {
    transcriptions: Arc<dyn TranscriptionRepository>,
    audio_assets: Arc<dyn AudioAssetRepository>,
    registry: Arc<ProviderRegistry>,
}

impl TranscriptionService {
    pub fn new(
        transcriptions: Arc<dyn TranscriptionRepository>,
        audio_assets: Arc<dyn AudioAssetRepository>,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            transcriptions,
            audio_assets,
            registry,
        }
    }

    /// Creates a job in `Pending`. The referenced audio asset must exist and
    /// belong to the requesting user. Processing is a separate step.
    #[instrument(skip(self, input), fields(user_id = %input.user_id.as_uuid(), provider = %input.provider.as_str()))]
    pub async fn create_job(
        &self,
        input: CreateTranscriptionInput,
    ) -> Result<Transcription, TranscriptionServiceError> {
        let asset = self
            .audio_assets
            .get_by_id(input.audio_asset_id)
            .await?
            .filter(|asset| asset.user_id == input.user_id)
            .ok_or(TranscriptionServiceError::AudioAssetNotFound)?;

        let metadata = json!({
            "additionalConfig": Value::Object(input.additional_config.unwrap_or_default()),
            "diarize": input.diarize.unwrap_or(true),
        });

        let mut transcription =
            Transcription::pending(input.user_id, asset.id, input.provider, metadata);
        transcription.model = input.model;
        transcription.language = input.language;
        transcription.custom_prompt = input.custom_prompt.clone();
        transcription.prompt_used = input.prompt_template.or(input.custom_prompt);

        self.transcriptions.create(&transcription).await?;

        tracing::info!(
            transcription_id = %transcription.id.as_uuid(),
            "Transcription job created"
        );

        Ok(transcription)
    }

    /// Runs the job state machine to a terminal state. Missing job or audio
    /// asset fails fast without touching any state; anything after
    /// `Processing` was recorded ends in `Failed` and the error is still
    /// propagated to the caller.
    #[instrument(skip(self), fields(transcription_id = %id.as_uuid()))]
    pub async fn process(&self, id: TranscriptionId) -> Result<(), TranscriptionServiceError> {
        let job = self
            .transcriptions
            .get_by_id(id)
            .await?
            .ok_or(TranscriptionServiceError::NotFound)?;
        let asset = self
            .audio_assets
            .get_by_id(job.audio_asset_id)
            .await?
            .ok_or(TranscriptionServiceError::NotFound)?;

        // Resolve the adapter before any status write so that configuration
        // errors leave the job untouched.
        let adapter = self.registry.get(job.provider)?;

        self.transcriptions.mark_processing(id).await?;

        let payload = Self::payload_for(&job, &asset);

        match adapter.transcribe(payload).await {
            Ok(result) => {
                let segment_count = result.segments.len();
                let speaker_count = result.speakers.len();
                let transcript = Self::completed_transcript(&job, &asset, result);

                if let Err(e) = self.transcriptions.complete(id, &transcript).await {
                    self.record_failure(id, &e.to_string(), None).await;
                    return Err(e.into());
                }

                tracing::info!(
                    segments = segment_count,
                    speakers = speaker_count,
                    "Transcription completed"
                );
                Ok(())
            }
            Err(e) => {
                self.record_failure(id, &e.to_string(), e.code().as_deref())
                    .await;
                Err(e.into())
            }
        }
    }

    pub async fn get_detail(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<TranscriptionDetail>, TranscriptionServiceError> {
        Ok(self.transcriptions.get_detail(id, user_id).await?)
    }

    pub async fn list_jobs(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Transcription>, TranscriptionServiceError> {
        Ok(self.transcriptions.list_by_user(user_id, limit).await?)
    }

    pub async fn list_models(
        &self,
        provider: TranscriptionProvider,
    ) -> Result<Vec<String>, TranscriptionServiceError> {
        let adapter = self.registry.get(provider)?;
        Ok(adapter.list_models().await?)
    }

    /// Patches the user-editable fields (title, custom prompt). Terminal jobs
    /// stay editable here; `status` is never touched.
    pub async fn update_metadata(
        &self,
        id: TranscriptionId,
        user_id: UserId,
        patch: MetadataPatch,
    ) -> Result<(), TranscriptionServiceError> {
        let normalized = MetadataPatch {
            title: patch.title.map(|value| value.and_then(trim_to_option)),
            custom_prompt: patch
                .custom_prompt
                .map(|value| value.and_then(trim_to_option)),
        };
        Ok(self
            .transcriptions
            .update_metadata(id, user_id, &normalized)
            .await?)
    }

    pub async fn rename_speaker(
        &self,
        transcription_id: TranscriptionId,
        user_id: UserId,
        speaker_id: SpeakerId,
        display_name: &str,
    ) -> Result<Speaker, TranscriptionServiceError> {
        self.transcriptions
            .get_by_id(transcription_id)
            .await?
            .filter(|job| job.user_id == user_id)
            .ok_or(TranscriptionServiceError::NotFound)?;

        Ok(self
            .transcriptions
            .rename_speaker(transcription_id, speaker_id, display_name)
            .await?)
    }

    fn payload_for(job: &Transcription, asset: &AudioAsset) -> TranscriptionPayload {
        let diarize = job
            .metadata
            .get("diarize")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let additional_config = job
            .metadata
            .get("additionalConfig")
            .and_then(Value::as_object)
            .filter(|map| !map.is_empty())
            .cloned();

        TranscriptionPayload {
            user_id: job.user_id,
            file_url: asset.file_url.clone(),
            model: job.model.clone(),
            prompt: job.custom_prompt.clone(),
            language: job.language.clone(),
            diarize,
            additional_config,
        }
    }

    fn completed_transcript(
        job: &Transcription,
        asset: &AudioAsset,
        result: TranscriptionResult,
    ) -> CompletedTranscript {
        let mut metadata = match &job.metadata {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        metadata.insert(
            "providerResponse".to_string(),
            result.metadata.unwrap_or_else(|| json!({})),
        );

        CompletedTranscript {
            external_job_id: result.external_job_id,
            language: result.language,
            // The vendor does not always report a duration; the asset's known
            // duration is the fallback.
            duration_seconds: result.duration_seconds.or(asset.duration_seconds),
            confidence: result.confidence,
            metadata: Value::Object(metadata),
            speakers: result
                .speakers
                .into_iter()
                .map(|speaker| SpeakerDraft {
                    speaker_key: speaker.speaker_key,
                    display_name: speaker.display_name,
                })
                .collect(),
            segments: result
                .segments
                .into_iter()
                .map(|segment| SegmentDraft {
                    speaker_key: segment.speaker_key,
                    start_ms: segment.start_ms,
                    end_ms: segment.end_ms,
                    text: segment.text,
                    confidence: segment.confidence,
                    words: segment.words,
                })
                .collect(),
            completed_at: Utc::now(),
        }
    }

    async fn record_failure(&self, id: TranscriptionId, message: &str, code: Option<&str>) {
        if let Err(e) = self.transcriptions.mark_failed(id, message, code).await {
            tracing::error!(error = %e, "Failed to persist FAILED status");
        }
    }
}

fn trim_to_option(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionServiceError {
    #[error("audio asset not found for this user")]
    AudioAssetNotFound,
    #[error("transcription or audio asset not found")]
    NotFound,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
