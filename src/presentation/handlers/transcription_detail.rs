use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::application::ports::MetadataPatch;
use crate::domain::TranscriptionId;
use crate::presentation::state::AppState;

use super::auth::require_user;
use super::responses::{TranscriptionDetailResponse, error_body, service_error_response};

#[derive(Serialize)]
pub struct TranscriptionDetailEnvelope {
    pub data: TranscriptionDetailResponse,
}

#[tracing::instrument(skip(state, headers))]
pub async fn get_transcription_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection.into_response(),
    };

    match state
        .transcription_service
        .get_detail(TranscriptionId::from_uuid(id), user_id)
        .await
    {
        Ok(Some(detail)) => Json(TranscriptionDetailEnvelope {
            data: TranscriptionDetailResponse::from(&detail),
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, error_body("Transcription not found")).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch transcription");
            service_error_response(&e).into_response()
        }
    }
}

/// Absent field = leave alone; explicit `null` = clear.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTranscriptionRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_prompt: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[tracing::instrument(skip(state, headers, request))]
pub async fn update_transcription_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTranscriptionRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection.into_response(),
    };

    let patch = MetadataPatch {
        title: request.title,
        custom_prompt: request.custom_prompt,
    };
    if patch.is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("No fields to update")).into_response();
    }

    let id = TranscriptionId::from_uuid(id);
    if let Err(e) = state
        .transcription_service
        .update_metadata(id, user_id, patch)
        .await
    {
        return service_error_response(&e).into_response();
    }

    match state.transcription_service.get_detail(id, user_id).await {
        Ok(Some(detail)) => Json(TranscriptionDetailEnvelope {
            data: TranscriptionDetailResponse::from(&detail),
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, error_body("Transcription not found")).into_response(),
        Err(e) => service_error_response(&e).into_response(),
    }
}
