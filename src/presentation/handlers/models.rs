use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::TranscriptionProvider;
use crate::presentation::state::AppState;

use super::responses::{error_body, service_error_response};

#[derive(Serialize)]
pub struct ModelListResponse {
    pub provider: String,
    pub models: Vec<String>,
}

#[tracing::instrument(skip(state))]
pub async fn list_models_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> impl IntoResponse {
    let provider: TranscriptionProvider = match provider.parse() {
        Ok(provider) => provider,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                error_body(format!("Unknown provider: {provider}")),
            )
                .into_response();
        }
    };

    match state.transcription_service.list_models(provider).await {
        Ok(models) => Json(ModelListResponse {
            provider: provider.as_str().to_string(),
            models,
        })
        .into_response(),
        Err(e) => service_error_response(&e).into_response(),
    }
}
