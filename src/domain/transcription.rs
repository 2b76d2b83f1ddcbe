use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{AudioAssetId, TranscriptionId, TranscriptionProvider, TranscriptionStatus, UserId};

/// One request to transcribe a specific audio asset with a specific
/// provider/model. Mutated only by the orchestrator during lifecycle
/// transitions, except for the user-editable `title`/`custom_prompt`.
///
/// Invariant: `completed_at` is `Some` iff `status == Completed`.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub id: TranscriptionId,
    pub user_id: UserId,
    pub audio_asset_id: AudioAssetId,
    pub provider: TranscriptionProvider,
    pub model: Option<String>,
    pub title: Option<String>,
    pub status: TranscriptionStatus,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub confidence: Option<f64>,
    pub custom_prompt: Option<String>,
    pub prompt_used: Option<String>,
    pub external_job_id: Option<String>,
    /// Opaque JSON object holding per-vendor request options
    /// (`additionalConfig`, `diarize`) and, after completion, the raw
    /// provider response under `providerResponse`.
    pub metadata: Value,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transcription {
    pub fn pending(
        user_id: UserId,
        audio_asset_id: AudioAssetId,
        provider: TranscriptionProvider,
        metadata: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TranscriptionId::new(),
            user_id,
            audio_asset_id,
            provider,
            model: None,
            title: None,
            status: TranscriptionStatus::Pending,
            language: None,
            duration_seconds: None,
            confidence: None,
            custom_prompt: None,
            prompt_used: None,
            external_job_id: None,
            metadata,
            error_code: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
