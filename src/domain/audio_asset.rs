use chrono::{DateTime, Utc};

use super::{AudioAssetId, UserId};

/// An uploaded audio file, produced by the (external) upload flow.
/// The pipeline only reads `file_url` and `duration_seconds`.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub id: AudioAssetId,
    pub user_id: UserId,
    pub file_url: String,
    pub filename: String,
    pub mime_type: Option<String>,
    pub duration_seconds: Option<f64>,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
