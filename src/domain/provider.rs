use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of supported speech-to-text vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscriptionProvider {
    #[serde(rename = "DEEPGRAM")]
    Deepgram,
    #[serde(rename = "ELEVENLABS")]
    ElevenLabs,
    #[serde(rename = "OPENAI")]
    OpenAi,
}

impl TranscriptionProvider {
    pub const ALL: [TranscriptionProvider; 3] = [
        TranscriptionProvider::Deepgram,
        TranscriptionProvider::ElevenLabs,
        TranscriptionProvider::OpenAi,
    ];

    /// Stable wire value, also used as the persisted column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionProvider::Deepgram => "DEEPGRAM",
            TranscriptionProvider::ElevenLabs => "ELEVENLABS",
            TranscriptionProvider::OpenAi => "OPENAI",
        }
    }

    /// Human-facing vendor name.
    pub fn label(&self) -> &'static str {
        match self {
            TranscriptionProvider::Deepgram => "Deepgram",
            TranscriptionProvider::ElevenLabs => "ElevenLabs",
            TranscriptionProvider::OpenAi => "OpenAI",
        }
    }
}

impl FromStr for TranscriptionProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEEPGRAM" => Ok(TranscriptionProvider::Deepgram),
            "ELEVENLABS" => Ok(TranscriptionProvider::ElevenLabs),
            "OPENAI" => Ok(TranscriptionProvider::OpenAi),
            _ => Err(format!("Invalid transcription provider: {}", s)),
        }
    }
}

impl fmt::Display for TranscriptionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
