mod provider_registry;
mod transcription_service;

pub use provider_registry::ProviderRegistry;
pub use transcription_service::{
    CreateTranscriptionInput, TranscriptionService, TranscriptionServiceError,
};
