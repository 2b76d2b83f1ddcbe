use async_trait::async_trait;

use crate::domain::{AudioAsset, AudioAssetId};

use super::RepositoryError;

#[async_trait]
pub trait AudioAssetRepository: Send + Sync {
    async fn create(&self, asset: &AudioAsset) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: AudioAssetId) -> Result<Option<AudioAsset>, RepositoryError>;
}
