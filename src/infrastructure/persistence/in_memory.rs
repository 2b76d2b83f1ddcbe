use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{
    AudioAssetRepository, CompletedTranscript, CredentialError, CredentialStore, MetadataPatch,
    RepositoryError, TranscriptionDetail, TranscriptionRepository,
};
use crate::domain::{
    AudioAsset, AudioAssetId, Segment, SegmentId, Speaker, SpeakerId, Transcription,
    TranscriptionId, TranscriptionProvider, TranscriptionStatus, UserId,
};

/// Stateful in-memory repository, used by the test suites in place of
/// Postgres. Implements the same atomic-replacement semantics so lifecycle
/// invariants stay observable.
#[derive(Default)]
pub struct InMemoryTranscriptionRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    transcriptions: HashMap<Uuid, Transcription>,
    speakers: Vec<Speaker>,
    segments: Vec<Segment>,
}

impl InMemoryTranscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn speakers_of(&self, id: TranscriptionId) -> Vec<Speaker> {
        let state = self.state.lock().await;
        state
            .speakers
            .iter()
            .filter(|speaker| speaker.transcription_id == id)
            .cloned()
            .collect()
    }

    pub async fn segments_of(&self, id: TranscriptionId) -> Vec<Segment> {
        let state = self.state.lock().await;
        let mut segments: Vec<Segment> = state
            .segments
            .iter()
            .filter(|segment| segment.transcription_id == id)
            .cloned()
            .collect();
        segments.sort_by_key(|segment| segment.start_ms);
        segments
    }
}

#[async_trait]
impl TranscriptionRepository for InMemoryTranscriptionRepository {
    async fn create(&self, transcription: &Transcription) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state
            .transcriptions
            .insert(transcription.id.as_uuid(), transcription.clone());
        Ok(())
    }

    async fn get_by_id(
        &self,
        id: TranscriptionId,
    ) -> Result<Option<Transcription>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.transcriptions.get(&id.as_uuid()).cloned())
    }

    async fn get_detail(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<TranscriptionDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let Some(transcription) = state
            .transcriptions
            .get(&id.as_uuid())
            .filter(|t| t.user_id == user_id)
            .cloned()
        else {
            return Ok(None);
        };

        let speakers = state
            .speakers
            .iter()
            .filter(|speaker| speaker.transcription_id == id)
            .cloned()
            .collect();
        let mut segments: Vec<Segment> = state
            .segments
            .iter()
            .filter(|segment| segment.transcription_id == id)
            .cloned()
            .collect();
        segments.sort_by_key(|segment| segment.start_ms);

        Ok(Some(TranscriptionDetail {
            transcription,
            speakers,
            segments,
        }))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError> {
        let state = self.state.lock().await;
        let mut jobs: Vec<Transcription> = state
            .transcriptions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }

    async fn mark_processing(&self, id: TranscriptionId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let transcription = state
            .transcriptions
            .get_mut(&id.as_uuid())
            .ok_or_else(|| RepositoryError::NotFound("transcription".to_string()))?;
        transcription.status = TranscriptionStatus::Processing;
        transcription.error_code = None;
        transcription.error_message = None;
        transcription.completed_at = None;
        transcription.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: TranscriptionId,
        error_message: &str,
        error_code: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let transcription = state
            .transcriptions
            .get_mut(&id.as_uuid())
            .ok_or_else(|| RepositoryError::NotFound("transcription".to_string()))?;
        transcription.status = TranscriptionStatus::Failed;
        transcription.error_message = Some(error_message.to_string());
        transcription.error_code = error_code.map(str::to_owned);
        transcription.updated_at = Utc::now();
        Ok(())
    }

    async fn complete(
        &self,
        id: TranscriptionId,
        transcript: &CompletedTranscript,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.transcriptions.contains_key(&id.as_uuid()) {
            return Err(RepositoryError::NotFound("transcription".to_string()));
        }

        state
            .segments
            .retain(|segment| segment.transcription_id != id);
        state
            .speakers
            .retain(|speaker| speaker.transcription_id != id);

        let mut speaker_ids: HashMap<String, SpeakerId> = HashMap::new();
        for draft in &transcript.speakers {
            let speaker_id = SpeakerId::new();
            speaker_ids.insert(draft.speaker_key.clone(), speaker_id);
            state.speakers.push(Speaker {
                id: speaker_id,
                transcription_id: id,
                speaker_key: draft.speaker_key.clone(),
                display_name: draft.display_name.clone(),
            });
        }

        for draft in &transcript.segments {
            state.segments.push(Segment {
                id: SegmentId::new(),
                transcription_id: id,
                speaker_id: speaker_ids.get(&draft.speaker_key).copied(),
                speaker_key: draft.speaker_key.clone(),
                start_ms: draft.start_ms,
                end_ms: draft.end_ms,
                text: draft.text.clone(),
                confidence: draft.confidence,
                words: draft.words.clone(),
            });
        }

        let transcription = state
            .transcriptions
            .get_mut(&id.as_uuid())
            .ok_or_else(|| RepositoryError::NotFound("transcription".to_string()))?;
        transcription.status = TranscriptionStatus::Completed;
        transcription.external_job_id = transcript.external_job_id.clone();
        transcription.language = transcript.language.clone();
        transcription.duration_seconds = transcript.duration_seconds;
        transcription.confidence = transcript.confidence;
        transcription.metadata = transcript.metadata.clone();
        transcription.completed_at = Some(transcript.completed_at);
        transcription.updated_at = Utc::now();

        Ok(())
    }

    async fn update_metadata(
        &self,
        id: TranscriptionId,
        user_id: UserId,
        patch: &MetadataPatch,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        let transcription = state
            .transcriptions
            .get_mut(&id.as_uuid())
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| RepositoryError::NotFound("transcription".to_string()))?;

        if let Some(title) = &patch.title {
            transcription.title = title.clone();
        }
        if let Some(custom_prompt) = &patch.custom_prompt {
            transcription.custom_prompt = custom_prompt.clone();
        }
        transcription.updated_at = Utc::now();
        Ok(())
    }

    async fn rename_speaker(
        &self,
        transcription_id: TranscriptionId,
        speaker_id: SpeakerId,
        display_name: &str,
    ) -> Result<Speaker, RepositoryError> {
        let mut state = self.state.lock().await;
        let speaker = state
            .speakers
            .iter_mut()
            .find(|speaker| {
                speaker.id == speaker_id && speaker.transcription_id == transcription_id
            })
            .ok_or_else(|| RepositoryError::NotFound("speaker".to_string()))?;
        speaker.display_name = display_name.to_string();
        Ok(speaker.clone())
    }
}

#[derive(Default)]
pub struct InMemoryAudioAssetRepository {
    assets: Mutex<HashMap<Uuid, AudioAsset>>,
}

impl InMemoryAudioAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioAssetRepository for InMemoryAudioAssetRepository {
    async fn create(&self, asset: &AudioAsset) -> Result<(), RepositoryError> {
        let mut assets = self.assets.lock().await;
        assets.insert(asset.id.as_uuid(), asset.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: AudioAssetId) -> Result<Option<AudioAsset>, RepositoryError> {
        let assets = self.assets.lock().await;
        Ok(assets.get(&id.as_uuid()).cloned())
    }
}

/// Credential store that hands out one fixed plaintext key for every
/// configured provider, for adapter and orchestrator tests.
pub struct StaticCredentialStore {
    keys: HashMap<TranscriptionProvider, String>,
}

impl StaticCredentialStore {
    pub fn new(keys: Vec<(TranscriptionProvider, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn for_all_providers(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            keys: TranscriptionProvider::ALL
                .into_iter()
                .map(|provider| (provider, key.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn decrypted_key(
        &self,
        _user_id: UserId,
        provider: TranscriptionProvider,
    ) -> Result<String, CredentialError> {
        self.keys
            .get(&provider)
            .cloned()
            .ok_or(CredentialError::NotConfigured(provider))
    }
}
