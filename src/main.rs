use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use murmure::application::services::{ProviderRegistry, TranscriptionService};
use murmure::infrastructure::observability::{TracingConfig, init_tracing};
use murmure::infrastructure::persistence::{
    PgAudioAssetRepository, PgCredentialStore, PgTranscriptionRepository, create_pool,
};
use murmure::infrastructure::providers::{DeepgramAdapter, ElevenLabsAdapter, OpenAiAdapter};
use murmure::infrastructure::secrets::SecretBox;
use murmure::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig::new(environment.as_str(), settings.logging.enable_json),
        settings.server.port,
    );

    let pool = create_pool(&settings.database.url, settings.database.max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let secret_box = SecretBox::from_base64_key(&settings.security.encryption_key)
        .map_err(|e| anyhow::anyhow!("invalid APP__SECURITY__ENCRYPTION_KEY: {e}"))?;
    let credentials: Arc<dyn murmure::application::ports::CredentialStore> =
        Arc::new(PgCredentialStore::new(pool.clone(), secret_box));

    let registry = Arc::new(ProviderRegistry::new(vec![
        Arc::new(DeepgramAdapter::new(
            settings.providers.deepgram_api_base.clone(),
            Arc::clone(&credentials),
        )),
        Arc::new(ElevenLabsAdapter::new(
            settings.providers.elevenlabs_api_base.clone(),
            Arc::clone(&credentials),
        )),
        Arc::new(OpenAiAdapter::new(
            settings.providers.openai_api_base.clone(),
            Arc::clone(&credentials),
        )),
    ]));

    let transcription_service = Arc::new(TranscriptionService::new(
        Arc::new(PgTranscriptionRepository::new(pool.clone())),
        Arc::new(PgAudioAssetRepository::new(pool.clone())),
        registry,
    ));

    let state = AppState {
        transcription_service,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
