use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::application::services::CreateTranscriptionInput;
use crate::domain::{AudioAssetId, TranscriptionProvider};
use crate::presentation::state::AppState;

use super::auth::require_user;
use super::responses::{TranscriptionResponse, error_body, service_error_response};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTranscriptionRequest {
    pub audio_asset_id: Uuid,
    pub provider: String,
    pub model: Option<String>,
    pub prompt_template: Option<String>,
    pub custom_prompt: Option<String>,
    pub language: Option<String>,
    pub diarize: Option<bool>,
    pub additional_config: Option<Map<String, Value>>,
}

#[derive(Serialize)]
pub struct CreateTranscriptionResponse {
    pub data: TranscriptionResponse,
}

/// Creates the job and kicks off processing in the background. The response
/// never waits on (or reports) the vendor call; callers poll the job status.
#[tracing::instrument(skip(state, headers, request))]
pub async fn create_transcription_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTranscriptionRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection.into_response(),
    };

    let provider = match TranscriptionProvider::from_str(&request.provider) {
        Ok(provider) => provider,
        Err(e) => return (StatusCode::BAD_REQUEST, error_body(e)).into_response(),
    };

    let input = CreateTranscriptionInput {
        user_id,
        audio_asset_id: AudioAssetId::from_uuid(request.audio_asset_id),
        provider,
        model: request.model,
        prompt_template: request.prompt_template,
        custom_prompt: request.custom_prompt,
        language: request.language,
        diarize: request.diarize,
        additional_config: request.additional_config,
    };

    let job = match state.transcription_service.create_job(input).await {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!(error = %e, "Transcription job creation rejected");
            return service_error_response(&e).into_response();
        }
    };

    let service = Arc::clone(&state.transcription_service);
    let job_id = job.id;
    tokio::spawn(async move {
        if let Err(e) = service.process(job_id).await {
            tracing::error!(
                transcription_id = %job_id.as_uuid(),
                error = %e,
                "Transcription processing failed"
            );
        }
    });

    (
        StatusCode::CREATED,
        Json(CreateTranscriptionResponse {
            data: TranscriptionResponse::from(&job),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct ListTranscriptionsResponse {
    pub data: Vec<TranscriptionResponse>,
}

#[tracing::instrument(skip(state, headers))]
pub async fn list_transcriptions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection.into_response(),
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    match state.transcription_service.list_jobs(user_id, limit).await {
        Ok(jobs) => Json(ListTranscriptionsResponse {
            data: jobs.iter().map(TranscriptionResponse::from).collect(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list transcriptions");
            service_error_response(&e).into_response()
        }
    }
}
