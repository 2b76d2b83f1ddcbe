use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

use murmure::application::ports::{
    CredentialStore, ProviderAdapter, ProviderError, TranscriptionPayload,
};
use murmure::domain::{TranscriptionProvider, UserId};
use murmure::infrastructure::persistence::StaticCredentialStore;
use murmure::infrastructure::providers::{DeepgramAdapter, ElevenLabsAdapter, OpenAiAdapter};

/// Captured request from the mock vendor server: headers and JSON body.
type Captured = Arc<Mutex<Option<(HeaderMap, Value)>>>;

async fn start_mock_vendor_server(
    path: &'static str,
    response_status: u16,
    response_body: &'static str,
) -> (String, Captured, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let captured: Captured = Arc::new(Mutex::new(None));

    let capture = Arc::clone(&captured);
    let app = Router::new().route(
        path,
        post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
            *capture.lock().await = Some((headers, body));
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, captured, shutdown_tx)
}

fn credentials() -> Arc<dyn CredentialStore> {
    Arc::new(StaticCredentialStore::for_all_providers("test-api-key"))
}

fn minimal_payload() -> TranscriptionPayload {
    TranscriptionPayload {
        user_id: UserId::new(),
        file_url: "https://cdn.example.com/audio.mp3".to_string(),
        model: None,
        prompt: None,
        language: None,
        diarize: true,
        additional_config: None,
    }
}

#[tokio::test]
async fn given_successful_deepgram_response_when_transcribing_then_maps_segments() {
    let response_body = r#"{
        "metadata": {"request_id": "req_9", "duration": 10.0},
        "results": {"channels": [{"alternatives": [{"paragraphs": {"paragraphs": [
            {"sentences": [{"speaker": "spk_0", "start": 0.0, "end": 1.0, "text": "Hi."}]}
        ]}}]}]}
    }"#;
    let (base_url, captured, shutdown_tx) =
        start_mock_vendor_server("/v1/listen", 200, response_body).await;

    let adapter = DeepgramAdapter::new(base_url, credentials());
    let result = adapter.transcribe(minimal_payload()).await.unwrap();

    assert_eq!(result.external_job_id.as_deref(), Some("req_9"));
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].text, "Hi.");

    let (headers, body) = captured.lock().await.clone().unwrap();
    assert_eq!(
        headers.get("authorization").unwrap(),
        "Token test-api-key"
    );
    assert_eq!(body["url"], json!("https://cdn.example.com/audio.mp3"));
    assert_eq!(body["model"], json!("nova-3-general"));
    assert_eq!(body["diarize"], json!(true));
    assert_eq!(body["smart_format"], json!(true));
    assert_eq!(body["utterances"], json!(true));
    assert_eq!(body["paragraphs"], json!(true));
    assert_eq!(body["detect_language"], json!(true));
    assert!(body.get("language").is_none());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_explicit_language_when_deepgram_transcribes_then_detection_is_off() {
    let (base_url, captured, shutdown_tx) =
        start_mock_vendor_server("/v1/listen", 200, "{}").await;

    let adapter = DeepgramAdapter::new(base_url, credentials());
    let mut payload = minimal_payload();
    payload.language = Some("fr".to_string());
    payload.prompt = Some("medical vocabulary".to_string());
    adapter.transcribe(payload).await.unwrap();

    let (_, body) = captured.lock().await.clone().unwrap();
    assert_eq!(body["detect_language"], json!(false));
    assert_eq!(body["language"], json!("fr"));
    assert_eq!(body["prompt"], json!("medical vocabulary"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_additional_config_when_transcribing_then_it_overrides_defaults() {
    let (base_url, captured, shutdown_tx) =
        start_mock_vendor_server("/v1/listen", 200, "{}").await;

    let adapter = DeepgramAdapter::new(base_url, credentials());
    let mut payload = minimal_payload();
    let mut extra = serde_json::Map::new();
    extra.insert("smart_format".to_string(), json!(false));
    extra.insert("keywords".to_string(), json!(["sqlx"]));
    payload.additional_config = Some(extra);
    adapter.transcribe(payload).await.unwrap();

    let (_, body) = captured.lock().await.clone().unwrap();
    assert_eq!(body["smart_format"], json!(false));
    assert_eq!(body["keywords"], json!(["sqlx"]));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_vendor_error_status_when_transcribing_then_returns_api_error() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_vendor_server("/v1/listen", 402, r#"{"error": "payment required"}"#).await;

    let adapter = DeepgramAdapter::new(base_url, credentials());
    let result = adapter.transcribe(minimal_payload()).await;

    match result {
        Err(ProviderError::Api {
            provider,
            status,
            body,
        }) => {
            assert_eq!(provider, TranscriptionProvider::Deepgram);
            assert_eq!(status, 402);
            assert!(body.contains("payment required"));
        }
        other => panic!("expected Api error, got {:?}", other.map(|_| ())),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_credential_when_transcribing_then_returns_credential_error() {
    let (base_url, _captured, shutdown_tx) =
        start_mock_vendor_server("/v1/listen", 200, "{}").await;

    let credentials: Arc<dyn CredentialStore> = Arc::new(StaticCredentialStore::new(vec![(
        TranscriptionProvider::OpenAi,
        "only-openai".to_string(),
    )]));
    let adapter = DeepgramAdapter::new(base_url, credentials);

    let result = adapter.transcribe(minimal_payload()).await;

    assert!(matches!(result, Err(ProviderError::Credential(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_elevenlabs_payload_when_transcribing_then_sends_expected_body() {
    let (base_url, captured, shutdown_tx) =
        start_mock_vendor_server("/v1/speech-to-text/recognize", 200, "{}").await;

    let adapter = ElevenLabsAdapter::new(base_url, credentials());
    let mut payload = minimal_payload();
    payload.language = Some("de".to_string());
    adapter.transcribe(payload).await.unwrap();

    let (headers, body) = captured.lock().await.clone().unwrap();
    assert_eq!(headers.get("xi-api-key").unwrap(), "test-api-key");
    assert_eq!(body["model_id"], json!("scribe_v1"));
    assert_eq!(body["audio_url"], json!("https://cdn.example.com/audio.mp3"));
    assert_eq!(body["diarize"], json!(true));
    assert_eq!(body["language_code"], json!("de"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_openai_payload_when_transcribing_then_sends_expected_body() {
    let (base_url, captured, shutdown_tx) =
        start_mock_vendor_server("/audio/transcriptions", 200, r#"{"segments": []}"#).await;

    let adapter = OpenAiAdapter::new(base_url, credentials());
    let mut payload = minimal_payload();
    payload.model = Some("gpt-4o-transcribe".to_string());
    adapter.transcribe(payload).await.unwrap();

    let (headers, body) = captured.lock().await.clone().unwrap();
    assert_eq!(
        headers.get("authorization").unwrap(),
        "Bearer test-api-key"
    );
    assert_eq!(body["model"], json!("gpt-4o-transcribe"));
    assert_eq!(body["response_format"], json!("verbose_json"));
    assert_eq!(body["temperature"], json!(0));
    assert_eq!(body["diarization"], json!(true));
    assert_eq!(body["file"], json!("https://cdn.example.com/audio.mp3"));
    shutdown_tx.send(()).ok();
}
