use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{AudioAssetRepository, RepositoryError};
use crate::domain::{AudioAsset, AudioAssetId, UserId};

pub struct PgAudioAssetRepository {
    pool: PgPool,
}

impl PgAudioAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AudioAssetRepository for PgAudioAssetRepository {
    #[instrument(skip(self, asset), fields(audio_asset_id = %asset.id.as_uuid()))]
    async fn create(&self, asset: &AudioAsset) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO audio_assets
                 (id, user_id, file_url, filename, mime_type, duration_seconds, size_bytes,
                  created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(asset.id.as_uuid())
        .bind(asset.user_id.as_uuid())
        .bind(&asset.file_url)
        .bind(&asset.filename)
        .bind(&asset.mime_type)
        .bind(asset.duration_seconds)
        .bind(asset.size_bytes)
        .bind(asset.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(audio_asset_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: AudioAssetId) -> Result<Option<AudioAsset>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, file_url, filename, mime_type, duration_seconds, size_bytes,
                    created_at
             FROM audio_assets WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(|row| -> Result<AudioAsset, RepositoryError> {
            let fail = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
            Ok(AudioAsset {
                id: AudioAssetId::from_uuid(row.try_get("id").map_err(fail)?),
                user_id: UserId::from_uuid(row.try_get("user_id").map_err(fail)?),
                file_url: row.try_get("file_url").map_err(fail)?,
                filename: row.try_get("filename").map_err(fail)?,
                mime_type: row.try_get("mime_type").map_err(fail)?,
                duration_seconds: row.try_get("duration_seconds").map_err(fail)?,
                size_bytes: row.try_get("size_bytes").map_err(fail)?,
                created_at: row.try_get("created_at").map_err(fail)?,
            })
        })
        .transpose()
    }
}
