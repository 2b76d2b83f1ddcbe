use async_trait::async_trait;

use crate::domain::{TranscriptionProvider, UserId};

/// Access to the user's stored vendor API keys. Key upload and encryption
/// live outside this service; the pipeline only ever reads.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn decrypted_key(
        &self,
        user_id: UserId,
        provider: TranscriptionProvider,
    ) -> Result<String, CredentialError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no {} API key configured for this user", .0.label())]
    NotConfigured(TranscriptionProvider),
    #[error("stored {} API key could not be decrypted: {}", .0.label(), .1)]
    DecryptionFailed(TranscriptionProvider, String),
    #[error("credential lookup failed: {0}")]
    Storage(String),
}
