use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{
    CompletedTranscript, MetadataPatch, RepositoryError, TranscriptionDetail,
    TranscriptionRepository,
};
use crate::domain::{
    AudioAssetId, Segment, SegmentId, Speaker, SpeakerId, Transcription, TranscriptionId,
    TranscriptionProvider, TranscriptionStatus, UserId, WordTiming,
};

pub struct PgTranscriptionRepository {
    pool: PgPool,
}

impl PgTranscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TRANSCRIPTION_COLUMNS: &str = "id, user_id, audio_asset_id, provider, model, title, status, \
     language, duration_seconds, confidence, custom_prompt, prompt_used, external_job_id, \
     metadata, error_code, error_message, created_at, updated_at, completed_at";

fn map_transcription(row: &PgRow) -> Result<Transcription, RepositoryError> {
    let status: String = get(row, "status")?;
    let provider: String = get(row, "provider")?;

    Ok(Transcription {
        id: TranscriptionId::from_uuid(get(row, "id")?),
        user_id: UserId::from_uuid(get(row, "user_id")?),
        audio_asset_id: AudioAssetId::from_uuid(get(row, "audio_asset_id")?),
        provider: provider
            .parse::<TranscriptionProvider>()
            .map_err(RepositoryError::Corrupted)?,
        model: get(row, "model")?,
        title: get(row, "title")?,
        status: status
            .parse::<TranscriptionStatus>()
            .map_err(RepositoryError::Corrupted)?,
        language: get(row, "language")?,
        duration_seconds: get(row, "duration_seconds")?,
        confidence: get(row, "confidence")?,
        custom_prompt: get(row, "custom_prompt")?,
        prompt_used: get(row, "prompt_used")?,
        external_job_id: get(row, "external_job_id")?,
        metadata: get(row, "metadata")?,
        error_code: get(row, "error_code")?,
        error_message: get(row, "error_message")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
        completed_at: get(row, "completed_at")?,
    })
}

fn map_speaker(row: &PgRow) -> Result<Speaker, RepositoryError> {
    Ok(Speaker {
        id: SpeakerId::from_uuid(get(row, "id")?),
        transcription_id: TranscriptionId::from_uuid(get(row, "transcription_id")?),
        speaker_key: get(row, "speaker_key")?,
        display_name: get(row, "display_name")?,
    })
}

fn map_segment(row: &PgRow) -> Result<Segment, RepositoryError> {
    let words: Option<Value> = get(row, "words")?;
    let words: Option<Vec<WordTiming>> = words
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
    let speaker_id: Option<Uuid> = get(row, "speaker_id")?;

    Ok(Segment {
        id: SegmentId::from_uuid(get(row, "id")?),
        transcription_id: TranscriptionId::from_uuid(get(row, "transcription_id")?),
        speaker_id: speaker_id.map(SpeakerId::from_uuid),
        speaker_key: get(row, "speaker_key")?,
        start_ms: get(row, "start_ms")?,
        end_ms: get(row, "end_ms")?,
        text: get(row, "text")?,
        confidence: get(row, "confidence")?,
        words,
    })
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl TranscriptionRepository for PgTranscriptionRepository {
    #[instrument(skip(self, transcription), fields(transcription_id = %transcription.id.as_uuid()))]
    async fn create(&self, transcription: &Transcription) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO transcriptions
                (id, user_id, audio_asset_id, provider, model, title, status, language,
                 duration_seconds, confidence, custom_prompt, prompt_used, external_job_id,
                 metadata, error_code, error_message, created_at, updated_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(transcription.id.as_uuid())
        .bind(transcription.user_id.as_uuid())
        .bind(transcription.audio_asset_id.as_uuid())
        .bind(transcription.provider.as_str())
        .bind(&transcription.model)
        .bind(&transcription.title)
        .bind(transcription.status.as_str())
        .bind(&transcription.language)
        .bind(transcription.duration_seconds)
        .bind(transcription.confidence)
        .bind(&transcription.custom_prompt)
        .bind(&transcription.prompt_used)
        .bind(&transcription.external_job_id)
        .bind(&transcription.metadata)
        .bind(&transcription.error_code)
        .bind(&transcription.error_message)
        .bind(transcription.created_at)
        .bind(transcription.updated_at)
        .bind(transcription.completed_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self), fields(transcription_id = %id.as_uuid()))]
    async fn get_by_id(
        &self,
        id: TranscriptionId,
    ) -> Result<Option<Transcription>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transcriptions WHERE id = $1",
            TRANSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.as_ref().map(map_transcription).transpose()
    }

    #[instrument(skip(self), fields(transcription_id = %id.as_uuid()))]
    async fn get_detail(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<TranscriptionDetail>, RepositoryError> {
        // One transaction so the job, speakers and segments come from a
        // single consistent snapshot.
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM transcriptions WHERE id = $1 AND user_id = $2",
            TRANSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let transcription = map_transcription(&row)?;

        let speakers = sqlx::query(
            "SELECT id, transcription_id, speaker_key, display_name
             FROM speakers WHERE transcription_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_failed)?
        .iter()
        .map(map_speaker)
        .collect::<Result<Vec<_>, _>>()?;

        let segments = sqlx::query(
            "SELECT id, transcription_id, speaker_id, speaker_key, start_ms, end_ms, text,
                    confidence, words
             FROM segments WHERE transcription_id = $1
             ORDER BY start_ms ASC",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(query_failed)?
        .iter()
        .map(map_segment)
        .collect::<Result<Vec<_>, _>>()?;

        tx.commit().await.map_err(query_failed)?;

        Ok(Some(TranscriptionDetail {
            transcription,
            speakers,
            segments,
        }))
    }

    #[instrument(skip(self), fields(user_id = %user_id.as_uuid()))]
    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError> {
        sqlx::query(&format!(
            "SELECT {} FROM transcriptions WHERE user_id = $1
             ORDER BY created_at DESC LIMIT $2",
            TRANSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?
        .iter()
        .map(map_transcription)
        .collect()
    }

    #[instrument(skip(self), fields(transcription_id = %id.as_uuid()))]
    async fn mark_processing(&self, id: TranscriptionId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transcriptions
             SET status = $1, error_code = NULL, error_message = NULL,
                 completed_at = NULL, updated_at = $2
             WHERE id = $3",
        )
        .bind(TranscriptionStatus::Processing.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("transcription".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, error_message), fields(transcription_id = %id.as_uuid()))]
    async fn mark_failed(
        &self,
        id: TranscriptionId,
        error_message: &str,
        error_code: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transcriptions
             SET status = $1, error_message = $2, error_code = $3, updated_at = $4
             WHERE id = $5",
        )
        .bind(TranscriptionStatus::Failed.as_str())
        .bind(error_message)
        .bind(error_code)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("transcription".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, transcript), fields(transcription_id = %id.as_uuid()))]
    async fn complete(
        &self,
        id: TranscriptionId,
        transcript: &CompletedTranscript,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query("DELETE FROM segments WHERE transcription_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;
        sqlx::query("DELETE FROM speakers WHERE transcription_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        let mut speaker_ids: HashMap<&str, Uuid> = HashMap::new();
        for draft in &transcript.speakers {
            let speaker_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO speakers (id, transcription_id, speaker_key, display_name)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(speaker_id)
            .bind(id.as_uuid())
            .bind(&draft.speaker_key)
            .bind(&draft.display_name)
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;
            speaker_ids.insert(draft.speaker_key.as_str(), speaker_id);
        }

        for draft in &transcript.segments {
            let words: Option<Value> = draft
                .words
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
            sqlx::query(
                "INSERT INTO segments
                     (id, transcription_id, speaker_id, speaker_key, start_ms, end_ms, text,
                      confidence, words)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(Uuid::new_v4())
            .bind(id.as_uuid())
            .bind(speaker_ids.get(draft.speaker_key.as_str()).copied())
            .bind(&draft.speaker_key)
            .bind(draft.start_ms)
            .bind(draft.end_ms)
            .bind(&draft.text)
            .bind(draft.confidence)
            .bind(words)
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;
        }

        let result = sqlx::query(
            "UPDATE transcriptions
             SET status = $1, external_job_id = $2, language = $3, duration_seconds = $4,
                 confidence = $5, metadata = $6, completed_at = $7, updated_at = $8
             WHERE id = $9",
        )
        .bind(TranscriptionStatus::Completed.as_str())
        .bind(&transcript.external_job_id)
        .bind(&transcript.language)
        .bind(transcript.duration_seconds)
        .bind(transcript.confidence)
        .bind(&transcript.metadata)
        .bind(transcript.completed_at)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("transcription".to_string()));
        }

        tx.commit().await.map_err(query_failed)?;
        Ok(())
    }

    #[instrument(skip(self, patch), fields(transcription_id = %id.as_uuid()))]
    async fn update_metadata(
        &self,
        id: TranscriptionId,
        user_id: UserId,
        patch: &MetadataPatch,
    ) -> Result<(), RepositoryError> {
        if patch.is_empty() {
            return Ok(());
        }

        // One statement so a partial patch can never be half-applied.
        let result = sqlx::query(
            "UPDATE transcriptions
             SET title = CASE WHEN $1 THEN $2 ELSE title END,
                 custom_prompt = CASE WHEN $3 THEN $4 ELSE custom_prompt END,
                 updated_at = $5
             WHERE id = $6 AND user_id = $7",
        )
        .bind(patch.title.is_some())
        .bind(patch.title.as_ref().and_then(|title| title.as_deref()))
        .bind(patch.custom_prompt.is_some())
        .bind(
            patch
                .custom_prompt
                .as_ref()
                .and_then(|prompt| prompt.as_deref()),
        )
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("transcription".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, display_name), fields(speaker_id = %speaker_id.as_uuid()))]
    async fn rename_speaker(
        &self,
        transcription_id: TranscriptionId,
        speaker_id: SpeakerId,
        display_name: &str,
    ) -> Result<Speaker, RepositoryError> {
        let row = sqlx::query(
            "UPDATE speakers SET display_name = $1
             WHERE id = $2 AND transcription_id = $3
             RETURNING id, transcription_id, speaker_key, display_name",
        )
        .bind(display_name)
        .bind(speaker_id.as_uuid())
        .bind(transcription_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(row) => map_speaker(&row),
            None => Err(RepositoryError::NotFound("speaker".to_string())),
        }
    }
}
