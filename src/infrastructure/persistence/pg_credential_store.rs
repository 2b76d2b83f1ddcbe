use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{CredentialError, CredentialStore};
use crate::domain::{TranscriptionProvider, UserId};
use crate::infrastructure::secrets::SecretBox;

/// Reads a user's encrypted vendor API key from the `api_keys` table and
/// opens it with the process-wide secret box. Key upload/rotation is handled
/// by an external settings surface; this store only ever reads.
pub struct PgCredentialStore {
    pool: PgPool,
    secret_box: SecretBox,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, secret_box: SecretBox) -> Self {
        Self { pool, secret_box }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self), fields(user_id = %user_id.as_uuid(), provider = %provider.as_str()))]
    async fn decrypted_key(
        &self,
        user_id: UserId,
        provider: TranscriptionProvider,
    ) -> Result<String, CredentialError> {
        let row = sqlx::query(
            "SELECT encrypted, nonce FROM api_keys WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id.as_uuid())
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialError::Storage(e.to_string()))?
        .ok_or(CredentialError::NotConfigured(provider))?;

        let encrypted: String = row
            .try_get("encrypted")
            .map_err(|e| CredentialError::Storage(e.to_string()))?;
        let nonce: String = row
            .try_get("nonce")
            .map_err(|e| CredentialError::Storage(e.to_string()))?;

        self.secret_box
            .decrypt(&encrypted, &nonce)
            .map_err(|e| CredentialError::DecryptionFailed(provider, e.to_string()))
    }
}
