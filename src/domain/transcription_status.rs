use std::fmt;
use std::str::FromStr;

/// Lifecycle of a transcription job.
///
/// `Uploading` belongs to the upload phase and `Cancelled` is reserved for a
/// future cancellation flow; the processing pipeline only ever produces
/// `Pending`, `Processing`, `Completed` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptionStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TranscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStatus::Pending => "PENDING",
            TranscriptionStatus::Uploading => "UPLOADING",
            TranscriptionStatus::Processing => "PROCESSING",
            TranscriptionStatus::Completed => "COMPLETED",
            TranscriptionStatus::Failed => "FAILED",
            TranscriptionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TranscriptionStatus::Completed
                | TranscriptionStatus::Failed
                | TranscriptionStatus::Cancelled
        )
    }
}

impl FromStr for TranscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TranscriptionStatus::Pending),
            "UPLOADING" => Ok(TranscriptionStatus::Uploading),
            "PROCESSING" => Ok(TranscriptionStatus::Processing),
            "COMPLETED" => Ok(TranscriptionStatus::Completed),
            "FAILED" => Ok(TranscriptionStatus::Failed),
            "CANCELLED" => Ok(TranscriptionStatus::Cancelled),
            _ => Err(format!("Invalid transcription status: {}", s)),
        }
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
