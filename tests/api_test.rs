use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;

use murmure::application::ports::{
    AudioAssetRepository, ProviderAdapter, ProviderError, SegmentResult, SpeakerResult,
    TranscriptionPayload, TranscriptionResult,
};
use murmure::application::services::{ProviderRegistry, TranscriptionService};
use murmure::domain::{AudioAsset, AudioAssetId, TranscriptionProvider, UserId};
use murmure::infrastructure::persistence::{
    InMemoryAudioAssetRepository, InMemoryTranscriptionRepository,
};
use murmure::presentation::{AppState, create_router};

/// Adapter that always succeeds with a fixed two-speaker transcript.
struct FixedAdapter {
    provider: TranscriptionProvider,
}

#[async_trait]
impl ProviderAdapter for FixedAdapter {
    fn id(&self) -> TranscriptionProvider {
        self.provider
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec!["fixed-model-1".to_string(), "fixed-model-2".to_string()])
    }

    async fn transcribe(
        &self,
        _payload: TranscriptionPayload,
    ) -> Result<TranscriptionResult, ProviderError> {
        Ok(TranscriptionResult {
            external_job_id: Some("req_fixed".to_string()),
            language: Some("en".to_string()),
            duration_seconds: Some(12.0),
            confidence: Some(0.9),
            segments: vec![SegmentResult {
                speaker_key: "spk_0".to_string(),
                start_ms: 0,
                end_ms: 1200,
                text: "Hello.".to_string(),
                confidence: Some(0.95),
                words: None,
            }],
            speakers: vec![SpeakerResult {
                speaker_key: "spk_0".to_string(),
                display_name: "Speaker 1".to_string(),
            }],
            metadata: Some(json!({"request_id": "req_fixed"})),
        })
    }
}

struct TestApp {
    router: Router,
    transcriptions: Arc<InMemoryTranscriptionRepository>,
    service: Arc<TranscriptionService>,
    user_id: UserId,
    asset_id: AudioAssetId,
}

async fn test_app() -> TestApp {
    let transcriptions = Arc::new(InMemoryTranscriptionRepository::new());
    let audio_assets = Arc::new(InMemoryAudioAssetRepository::new());
    let registry = Arc::new(ProviderRegistry::new(vec![Arc::new(FixedAdapter {
        provider: TranscriptionProvider::Deepgram,
    })]));
    let service = Arc::new(TranscriptionService::new(
        Arc::clone(&transcriptions) as _,
        Arc::clone(&audio_assets) as _,
        registry,
    ));

    let user_id = UserId::new();
    let asset_id = AudioAssetId::new();
    audio_assets
        .create(&AudioAsset {
            id: asset_id,
            user_id,
            file_url: "https://cdn.example.com/meeting.mp3".to_string(),
            filename: "meeting.mp3".to_string(),
            mime_type: Some("audio/mpeg".to_string()),
            duration_seconds: Some(12.0),
            size_bytes: 2048,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let router = create_router(AppState {
        transcription_service: Arc::clone(&service),
    });

    TestApp {
        router,
        transcriptions,
        service,
        user_id,
        asset_id,
    }
}

fn json_request(method: &str, uri: &str, user_id: Option<UserId>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.as_uuid().to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, user_id: Option<UserId>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id.as_uuid().to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_reports_healthy() {
    let app = test_app().await;

    let response = app.router.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("murmure"));
}

#[tokio::test]
async fn given_missing_user_header_when_creating_job_then_returns_unauthorized() {
    let app = test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/transcriptions",
        None,
        json!({"audioAssetId": app.asset_id.as_uuid(), "provider": "DEEPGRAM"}),
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_unknown_provider_when_creating_job_then_returns_bad_request() {
    let app = test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/transcriptions",
        Some(app.user_id),
        json!({"audioAssetId": app.asset_id.as_uuid(), "provider": "WHISPERX"}),
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_unknown_audio_asset_when_creating_job_then_returns_not_found() {
    let app = test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/transcriptions",
        Some(app.user_id),
        json!({"audioAssetId": uuid::Uuid::new_v4(), "provider": "DEEPGRAM"}),
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_valid_request_when_creating_job_then_returns_created_pending_job() {
    let app = test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/transcriptions",
        Some(app.user_id),
        json!({
            "audioAssetId": app.asset_id.as_uuid(),
            "provider": "DEEPGRAM",
            "customPrompt": "Expand abbreviations"
        }),
    );
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["provider"], json!("DEEPGRAM"));
    assert_eq!(body["data"]["status"], json!("PENDING"));
    assert_eq!(body["data"]["customPrompt"], json!("Expand abbreviations"));
    assert_eq!(body["data"]["promptUsed"], json!("Expand abbreviations"));
}

#[tokio::test]
async fn given_created_jobs_when_listing_then_only_own_jobs_are_returned() {
    let app = test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/transcriptions",
        Some(app.user_id),
        json!({"audioAssetId": app.asset_id.as_uuid(), "provider": "DEEPGRAM"}),
    );
    app.router.clone().oneshot(request).await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/transcriptions", Some(app.user_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let stranger = UserId::new();
    let response = app
        .router
        .oneshot(get_request("/api/v1/transcriptions", Some(stranger)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn given_processed_job_when_fetching_detail_then_includes_transcript() {
    let app = test_app().await;
    let job = app
        .service
        .create_job(murmure::application::services::CreateTranscriptionInput {
            user_id: app.user_id,
            audio_asset_id: app.asset_id,
            provider: TranscriptionProvider::Deepgram,
            model: None,
            prompt_template: None,
            custom_prompt: None,
            language: None,
            diarize: None,
            additional_config: None,
        })
        .await
        .unwrap();
    app.service.process(job.id).await.unwrap();

    let uri = format!("/api/v1/transcriptions/{}", job.id.as_uuid());
    let response = app
        .router
        .oneshot(get_request(&uri, Some(app.user_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], json!("COMPLETED"));
    assert_eq!(body["data"]["externalJobId"], json!("req_fixed"));
    assert_eq!(body["data"]["speakers"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["segments"][0]["text"], json!("Hello."));
    assert_eq!(body["data"]["segments"][0]["startMs"], json!(0));
    assert_eq!(body["data"]["segments"][0]["endMs"], json!(1200));
}

#[tokio::test]
async fn given_foreign_user_when_fetching_detail_then_returns_not_found() {
    let app = test_app().await;
    let job = app
        .service
        .create_job(murmure::application::services::CreateTranscriptionInput {
            user_id: app.user_id,
            audio_asset_id: app.asset_id,
            provider: TranscriptionProvider::Deepgram,
            model: None,
            prompt_template: None,
            custom_prompt: None,
            language: None,
            diarize: None,
            additional_config: None,
        })
        .await
        .unwrap();

    let uri = format!("/api/v1/transcriptions/{}", job.id.as_uuid());
    let response = app
        .router
        .oneshot(get_request(&uri, Some(UserId::new())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_empty_patch_when_updating_job_then_returns_bad_request() {
    let app = test_app().await;
    let job = app
        .service
        .create_job(murmure::application::services::CreateTranscriptionInput {
            user_id: app.user_id,
            audio_asset_id: app.asset_id,
            provider: TranscriptionProvider::Deepgram,
            model: None,
            prompt_template: None,
            custom_prompt: None,
            language: None,
            diarize: None,
            additional_config: None,
        })
        .await
        .unwrap();

    let uri = format!("/api/v1/transcriptions/{}", job.id.as_uuid());
    let response = app
        .router
        .oneshot(json_request("PATCH", &uri, Some(app.user_id), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_title_patch_when_updating_job_then_returns_updated_detail() {
    let app = test_app().await;
    let job = app
        .service
        .create_job(murmure::application::services::CreateTranscriptionInput {
            user_id: app.user_id,
            audio_asset_id: app.asset_id,
            provider: TranscriptionProvider::Deepgram,
            model: None,
            prompt_template: None,
            custom_prompt: Some("old prompt".to_string()),
            language: None,
            diarize: None,
            additional_config: None,
        })
        .await
        .unwrap();

    let uri = format!("/api/v1/transcriptions/{}", job.id.as_uuid());
    let response = app
        .router
        .oneshot(json_request(
            "PATCH",
            &uri,
            Some(app.user_id),
            json!({"title": "Standup notes", "customPrompt": null}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], json!("Standup notes"));
    assert_eq!(body["data"]["customPrompt"], json!(null));
}

#[tokio::test]
async fn given_processed_job_when_renaming_speaker_then_returns_new_name() {
    let app = test_app().await;
    let job = app
        .service
        .create_job(murmure::application::services::CreateTranscriptionInput {
            user_id: app.user_id,
            audio_asset_id: app.asset_id,
            provider: TranscriptionProvider::Deepgram,
            model: None,
            prompt_template: None,
            custom_prompt: None,
            language: None,
            diarize: None,
            additional_config: None,
        })
        .await
        .unwrap();
    app.service.process(job.id).await.unwrap();
    let speakers = app.transcriptions.speakers_of(job.id).await;

    let uri = format!(
        "/api/v1/transcriptions/{}/speakers/{}",
        job.id.as_uuid(),
        speakers[0].id.as_uuid()
    );
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &uri,
            Some(app.user_id),
            json!({"displayName": "Interviewer"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["displayName"], json!("Interviewer"));

    let response = app
        .router
        .oneshot(json_request(
            "PATCH",
            &uri,
            Some(app.user_id),
            json!({"displayName": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_registered_provider_when_listing_models_then_returns_its_models() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/providers/DEEPGRAM/models", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["provider"], json!("DEEPGRAM"));
    assert_eq!(body["models"], json!(["fixed-model-1", "fixed-model-2"]));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/providers/TELEPATHY/models", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Known provider without a registered adapter in this deployment.
    let response = app
        .router
        .oneshot(get_request("/api/v1/providers/OPENAI/models", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
