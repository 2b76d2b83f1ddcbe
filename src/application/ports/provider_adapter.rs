use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{TranscriptionProvider, UserId, WordTiming};

use super::CredentialError;

/// Vendor-agnostic transcription output, produced by the response mappers.
/// Segment and speaker order is the canonical document/playback order.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionResult {
    pub external_job_id: Option<String>,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub confidence: Option<f64>,
    pub segments: Vec<SegmentResult>,
    pub speakers: Vec<SpeakerResult>,
    /// Raw vendor payload, retained for audit/debug.
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SegmentResult {
    pub speaker_key: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    pub confidence: Option<f64>,
    pub words: Option<Vec<WordTiming>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerResult {
    pub speaker_key: String,
    pub display_name: String,
}

/// What an adapter needs to issue one vendor call on behalf of a user.
#[derive(Debug, Clone)]
pub struct TranscriptionPayload {
    pub user_id: UserId,
    pub file_url: String,
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub language: Option<String>,
    pub diarize: bool,
    /// Free-form vendor options, merged into the request body last so the
    /// caller can override any field.
    pub additional_config: Option<Map<String, Value>>,
}

/// The live network client for one vendor's transcription API.
/// Adapters raise, never persist; converting failures into job state is the
/// orchestrator's job alone.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> TranscriptionProvider;

    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    async fn transcribe(
        &self,
        payload: TranscriptionPayload,
    ) -> Result<TranscriptionResult, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {} is not supported", .0.as_str())]
    Unsupported(TranscriptionProvider),
    #[error("{provider} returned status {status}: {body}")]
    Api {
        provider: TranscriptionProvider,
        status: u16,
        body: String,
    },
    #[error("request to {0} failed: {1}")]
    Request(TranscriptionProvider, String),
    #[error("{0} returned an unusable response: {1}")]
    InvalidResponse(TranscriptionProvider, String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ProviderError {
    /// Machine-readable error code, when the failure carries one.
    /// A vendor HTTP status is the only such code today.
    pub fn code(&self) -> Option<String> {
        match self {
            ProviderError::Api { status, .. } => Some(format!("HTTP_{}", status)),
            _ => None,
        }
    }
}
