use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{
    Segment, Speaker, SpeakerId, Transcription, TranscriptionId, UserId, WordTiming,
};

use super::RepositoryError;

/// A job read together with its transcript, as one consistent snapshot.
/// Segments come back ordered by `start_ms` ascending.
#[derive(Debug, Clone)]
pub struct TranscriptionDetail {
    pub transcription: Transcription,
    pub speakers: Vec<Speaker>,
    pub segments: Vec<Segment>,
}

/// Everything the completion transition writes in one atomic unit.
#[derive(Debug, Clone)]
pub struct CompletedTranscript {
    pub external_job_id: Option<String>,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub confidence: Option<f64>,
    /// Full replacement metadata for the job (request options already merged
    /// with the raw provider response by the orchestrator).
    pub metadata: Value,
    pub speakers: Vec<SpeakerDraft>,
    pub segments: Vec<SegmentDraft>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SpeakerDraft {
    pub speaker_key: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct SegmentDraft {
    pub speaker_key: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    pub confidence: Option<f64>,
    pub words: Option<Vec<WordTiming>>,
}

/// Patch for the user-editable metadata fields. The outer `Option` is
/// "field present in the request", the inner one is the new value (explicit
/// null clears the field). Never touches `status`.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub title: Option<Option<String>>,
    pub custom_prompt: Option<Option<String>>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.custom_prompt.is_none()
    }
}

#[async_trait]
pub trait TranscriptionRepository: Send + Sync {
    async fn create(&self, transcription: &Transcription) -> Result<(), RepositoryError>;

    async fn get_by_id(
        &self,
        id: TranscriptionId,
    ) -> Result<Option<Transcription>, RepositoryError>;

    async fn get_detail(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<TranscriptionDetail>, RepositoryError>;

    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError>;

    /// `Pending|Failed|Completed -> Processing`; clears any prior error
    /// fields and `completed_at` so a re-run starts from a clean slate.
    async fn mark_processing(&self, id: TranscriptionId) -> Result<(), RepositoryError>;

    /// `Processing -> Failed` with a human-readable message and an optional
    /// machine-readable code.
    async fn mark_failed(
        &self,
        id: TranscriptionId,
        error_message: &str,
        error_code: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// `Processing -> Completed`: deletes the job's existing segments and
    /// speakers, inserts the new ones (resolving each segment's speaker by
    /// key), and updates the job row. All or nothing.
    async fn complete(
        &self,
        id: TranscriptionId,
        transcript: &CompletedTranscript,
    ) -> Result<(), RepositoryError>;

    async fn update_metadata(
        &self,
        id: TranscriptionId,
        user_id: UserId,
        patch: &MetadataPatch,
    ) -> Result<(), RepositoryError>;

    async fn rename_speaker(
        &self,
        transcription_id: TranscriptionId,
        speaker_id: SpeakerId,
        display_name: &str,
    ) -> Result<Speaker, RepositoryError>;
}
