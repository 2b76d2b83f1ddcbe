use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{SpeakerId, TranscriptionId};
use crate::presentation::state::AppState;

use super::auth::require_user;
use super::responses::{SpeakerResponse, error_body, service_error_response};

const MAX_DISPLAY_NAME_LEN: usize = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSpeakerRequest {
    pub display_name: String,
}

#[derive(Serialize)]
pub struct SpeakerEnvelope {
    pub data: SpeakerResponse,
}

#[tracing::instrument(skip(state, headers, request))]
pub async fn rename_speaker_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((transcription_id, speaker_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<RenameSpeakerRequest>,
) -> impl IntoResponse {
    let user_id = match require_user(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection.into_response(),
    };

    let display_name = request.display_name.trim();
    if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return (
            StatusCode::BAD_REQUEST,
            error_body("displayName must be between 1 and 100 characters"),
        )
            .into_response();
    }

    match state
        .transcription_service
        .rename_speaker(
            TranscriptionId::from_uuid(transcription_id),
            user_id,
            SpeakerId::from_uuid(speaker_id),
            display_name,
        )
        .await
    {
        Ok(speaker) => Json(SpeakerEnvelope {
            data: SpeakerResponse::from(&speaker),
        })
        .into_response(),
        Err(e) => service_error_response(&e).into_response(),
    }
}
