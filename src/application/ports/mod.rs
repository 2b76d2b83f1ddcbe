mod audio_asset_repository;
mod credential_store;
mod provider_adapter;
mod repository_error;
mod transcription_repository;

pub use audio_asset_repository::AudioAssetRepository;
pub use credential_store::{CredentialError, CredentialStore};
pub use provider_adapter::{
    ProviderAdapter, ProviderError, SegmentResult, SpeakerResult, TranscriptionPayload,
    TranscriptionResult,
};
pub use repository_error::RepositoryError;
pub use transcription_repository::{
    CompletedTranscript, MetadataPatch, SegmentDraft, SpeakerDraft, TranscriptionDetail,
    TranscriptionRepository,
};
