use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::application::ports::{ProviderError, RepositoryError, TranscriptionDetail};
use crate::application::services::TranscriptionServiceError;
use crate::domain::{Segment, Speaker, Transcription, WordTiming};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}

/// Maps service failures onto HTTP statuses. Vendor failures surface as 502
/// only on the synchronous paths (model listing); job processing itself is
/// fire-and-forget and reports through the job row.
pub fn service_error_response(e: &TranscriptionServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        TranscriptionServiceError::AudioAssetNotFound | TranscriptionServiceError::NotFound => {
            StatusCode::NOT_FOUND
        }
        TranscriptionServiceError::Repository(RepositoryError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        TranscriptionServiceError::Provider(ProviderError::Unsupported(_)) => {
            StatusCode::BAD_REQUEST
        }
        TranscriptionServiceError::Provider(_) => StatusCode::BAD_GATEWAY,
        TranscriptionServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error_body(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub id: String,
    pub audio_asset_id: String,
    pub provider: String,
    pub model: Option<String>,
    pub title: Option<String>,
    pub status: String,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub confidence: Option<f64>,
    pub custom_prompt: Option<String>,
    pub prompt_used: Option<String>,
    pub external_job_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl From<&Transcription> for TranscriptionResponse {
    fn from(t: &Transcription) -> Self {
        Self {
            id: t.id.as_uuid().to_string(),
            audio_asset_id: t.audio_asset_id.as_uuid().to_string(),
            provider: t.provider.as_str().to_string(),
            model: t.model.clone(),
            title: t.title.clone(),
            status: t.status.as_str().to_string(),
            language: t.language.clone(),
            duration_seconds: t.duration_seconds,
            confidence: t.confidence,
            custom_prompt: t.custom_prompt.clone(),
            prompt_used: t.prompt_used.clone(),
            external_job_id: t.external_job_id.clone(),
            error_code: t.error_code.clone(),
            error_message: t.error_message.clone(),
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
            completed_at: t.completed_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerResponse {
    pub id: String,
    pub speaker_key: String,
    pub display_name: String,
}

impl From<&Speaker> for SpeakerResponse {
    fn from(speaker: &Speaker) -> Self {
        Self {
            id: speaker.id.as_uuid().to_string(),
            speaker_key: speaker.speaker_key.clone(),
            display_name: speaker.display_name.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResponse {
    pub id: String,
    pub speaker_id: Option<String>,
    pub speaker_key: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
}

impl From<&Segment> for SegmentResponse {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id.as_uuid().to_string(),
            speaker_id: segment.speaker_id.map(|id| id.as_uuid().to_string()),
            speaker_key: segment.speaker_key.clone(),
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
            text: segment.text.clone(),
            confidence: segment.confidence,
            words: segment.words.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionDetailResponse {
    #[serde(flatten)]
    pub transcription: TranscriptionResponse,
    pub speakers: Vec<SpeakerResponse>,
    pub segments: Vec<SegmentResponse>,
}

impl From<&TranscriptionDetail> for TranscriptionDetailResponse {
    fn from(detail: &TranscriptionDetail) -> Self {
        Self {
            transcription: TranscriptionResponse::from(&detail.transcription),
            speakers: detail.speakers.iter().map(SpeakerResponse::from).collect(),
            segments: detail.segments.iter().map(SegmentResponse::from).collect(),
        }
    }
}
