use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::{ProviderAdapter, ProviderError};
use crate::domain::TranscriptionProvider;

/// Maps a provider identifier to its adapter. Built once at startup from the
/// vendor adapters; a lookup miss means the deployment was configured
/// without that vendor.
pub struct ProviderRegistry {
    adapters: HashMap<TranscriptionProvider, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();
        Self { adapters }
    }

    pub fn get(
        &self,
        provider: TranscriptionProvider,
    ) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or(ProviderError::Unsupported(provider))
    }
}
