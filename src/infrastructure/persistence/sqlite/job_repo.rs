//! SQLite Synthesis Job Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{RepositoryError, SynthesisJobRepositoryPort};
use crate::domain::synthesis::{
    AudioFormat, JobParts, JobStatus, NewSynthesisJob, SynthesisInput, SynthesisJob,
    SynthesisParams,
};

const JOB_COLUMNS: &str = "id, remote_task_id, status, input_text, input_file_id, voice_id, model, \
     audio_format, sample_rate, bitrate, channels, speed, volume, output_path, error_detail, \
     created_at, updated_at";

/// SQLite Synthesis Job Repository
pub struct SqliteSynthesisJobRepository {
    pool: DbPool,
}

impl SqliteSynthesisJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct JobRow {
    id: i64,
    remote_task_id: i64,
    status: String,
    input_text: Option<String>,
    input_file_id: Option<i64>,
    voice_id: String,
    model: String,
    audio_format: String,
    sample_rate: i64,
    bitrate: i64,
    channels: i64,
    speed: f64,
    volume: f64,
    output_path: Option<String>,
    error_detail: Option<String>,
    created_at: String,
    updated_at: String,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

impl TryFrom<JobRow> for SynthesisJob {
    type Error = RepositoryError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_str(&row.status).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown job status: {}", row.status))
        })?;
        let format = AudioFormat::from_str(&row.audio_format).ok_or_else(|| {
            RepositoryError::SerializationError(format!(
                "unknown audio format: {}",
                row.audio_format
            ))
        })?;
        let input = SynthesisInput::new(row.input_text, row.input_file_id)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(SynthesisJob::restore(JobParts {
            id: row.id,
            remote_task_id: row.remote_task_id,
            status,
            input,
            params: SynthesisParams {
                voice_id: row.voice_id,
                model: row.model,
                format,
                sample_rate: row.sample_rate as u32,
                bitrate: row.bitrate as u32,
                channels: row.channels as u8,
                speed: row.speed,
                volume: row.volume,
            },
            output_path: row.output_path,
            error_detail: row.error_detail,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        }))
    }
}

#[async_trait]
impl SynthesisJobRepositoryPort for SqliteSynthesisJobRepository {
    async fn create(&self, job: NewSynthesisJob) -> Result<SynthesisJob, RepositoryError> {
        let now = Utc::now();
        let stamp = now.to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO synthesis_jobs (
                remote_task_id, status, input_text, input_file_id, voice_id, model,
                audio_format, sample_rate, bitrate, channels, speed, volume,
                output_path, error_detail, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
            "#,
        )
        .bind(job.remote_task_id)
        .bind(job.status.as_str())
        .bind(job.input.text())
        .bind(job.input.file_id())
        .bind(&job.params.voice_id)
        .bind(&job.params.model)
        .bind(job.params.format.as_str())
        .bind(job.params.sample_rate as i64)
        .bind(job.params.bitrate as i64)
        .bind(job.params.channels as i64)
        .bind(job.params.speed)
        .bind(job.params.volume)
        .bind(&job.error_detail)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(SynthesisJob::create(result.last_insert_rowid(), job, now))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SynthesisJob>, RepositoryError> {
        let sql = format!("SELECT {} FROM synthesis_jobs WHERE id = ?", JOB_COLUMNS);
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(SynthesisJob::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<SynthesisJob>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM synthesis_jobs ORDER BY id DESC",
            JOB_COLUMNS
        );
        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(SynthesisJob::try_from).collect()
    }

    async fn save(&self, job: &SynthesisJob) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE synthesis_jobs
            SET status = ?, output_path = ?, error_detail = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(job.status().as_str())
        .bind(job.output_path())
        .bind(job.error_detail())
        .bind(job.updated_at().to_rfc3339())
        .bind(job.id())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "synthesis job {}",
                job.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM synthesis_jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
