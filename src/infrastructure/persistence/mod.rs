mod in_memory;
mod pg_audio_asset_repository;
mod pg_credential_store;
mod pg_pool;
mod pg_transcription_repository;

pub use in_memory::{
    InMemoryAudioAssetRepository, InMemoryTranscriptionRepository, StaticCredentialStore,
};
pub use pg_audio_asset_repository::PgAudioAssetRepository;
pub use pg_credential_store::PgCredentialStore;
pub use pg_pool::create_pool;
pub use pg_transcription_repository::PgTranscriptionRepository;
