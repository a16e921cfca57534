//! Synthesis Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobStatus, SynthesisError, SynthesisInput, SynthesisParams};

/// 尚未分配本地 ID 的合成任务（提交时创建，由 Job Ledger 分配 ID）
#[derive(Debug, Clone)]
pub struct NewSynthesisJob {
    pub remote_task_id: i64,
    pub status: JobStatus,
    pub input: SynthesisInput,
    pub params: SynthesisParams,
    pub error_detail: Option<String>,
}

impl NewSynthesisJob {
    /// 服务商已受理的异步任务
    pub fn accepted(input: SynthesisInput, params: SynthesisParams, remote_task_id: i64) -> Self {
        Self {
            remote_task_id,
            status: JobStatus::Processing,
            input,
            params,
            error_detail: None,
        }
    }

    /// 本地执行中的任务（同步合成，无 remote_task_id）
    pub fn local(input: SynthesisInput, params: SynthesisParams) -> Self {
        Self {
            remote_task_id: 0,
            status: JobStatus::Processing,
            input,
            params,
            error_detail: None,
        }
    }

    /// 提交即失败，直接进入 failed，不经过 processing
    pub fn rejected(
        input: SynthesisInput,
        params: SynthesisParams,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            remote_task_id: 0,
            status: JobStatus::Failed,
            input,
            params,
            error_detail: Some(error_detail.into()),
        }
    }
}

/// 从存储恢复聚合时使用的完整字段集
#[derive(Debug, Clone)]
pub struct JobParts {
    pub id: i64,
    pub remote_task_id: i64,
    pub status: JobStatus,
    pub input: SynthesisInput,
    pub params: SynthesisParams,
    pub output_path: Option<String>,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SynthesisJob 聚合根
///
/// 不变量:
/// - output_path 有值、status == failed、status == processing 三者恰有其一成立
/// - 终态（success / failed）不可变
/// - remote_task_id == 0 的任务无法通过轮询离开 processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisJob {
    id: i64,
    remote_task_id: i64,
    status: JobStatus,
    input: SynthesisInput,
    params: SynthesisParams,
    output_path: Option<String>,
    error_detail: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SynthesisJob {
    /// Ledger 分配 ID 并写入后创建聚合，created_at 与落库时间一致
    pub fn create(id: i64, new_job: NewSynthesisJob, now: DateTime<Utc>) -> Self {
        Self {
            id,
            remote_task_id: new_job.remote_task_id,
            status: new_job.status,
            input: new_job.input,
            params: new_job.params,
            output_path: None,
            error_detail: new_job.error_detail,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn restore(parts: JobParts) -> Self {
        Self {
            id: parts.id,
            remote_task_id: parts.remote_task_id,
            status: parts.status,
            input: parts.input,
            params: parts.params,
            output_path: parts.output_path,
            error_detail: parts.error_detail,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    /// processing -> success
    pub fn complete(&mut self, output_path: impl Into<String>) -> Result<(), SynthesisError> {
        self.ensure_processing()?;
        self.status = JobStatus::Success;
        self.output_path = Some(output_path.into());
        self.error_detail = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// processing -> failed
    pub fn fail(&mut self, detail: impl Into<String>) -> Result<(), SynthesisError> {
        self.ensure_processing()?;
        self.status = JobStatus::Failed;
        self.error_detail = Some(detail.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// 记录一次可重试的失败，状态保持 processing
    pub fn note_retry(&mut self, note: impl Into<String>) -> Result<(), SynthesisError> {
        self.ensure_processing()?;
        self.error_detail = Some(note.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_processing(&self) -> Result<(), SynthesisError> {
        if self.status.is_terminal() {
            return Err(SynthesisError::TerminalState(self.status));
        }
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// 是否为服务商追踪的异步任务
    pub fn is_remote_tracked(&self) -> bool {
        self.remote_task_id != 0
    }

    // Getters
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn remote_task_id(&self) -> i64 {
        self.remote_task_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn input(&self) -> &SynthesisInput {
        &self.input
    }

    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::AudioFormat;

    fn params() -> SynthesisParams {
        SynthesisParams {
            voice_id: "v1".to_string(),
            model: "speech-01-turbo".to_string(),
            format: AudioFormat::Mp3,
            sample_rate: 32000,
            bitrate: 128000,
            channels: 1,
            speed: 1.0,
            volume: 1.0,
        }
    }

    fn input() -> SynthesisInput {
        SynthesisInput::new(Some("hello".to_string()), None).unwrap()
    }

    #[test]
    fn test_accepted_job_starts_processing() {
        let job = SynthesisJob::create(
            1,
            NewSynthesisJob::accepted(input(), params(), 42),
            Utc::now(),
        );
        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(job.remote_task_id(), 42);
        assert!(job.is_remote_tracked());
        assert!(job.output_path().is_none());
    }

    #[test]
    fn test_rejected_job_is_failed_without_remote_id() {
        let job = SynthesisJob::create(
            1,
            NewSynthesisJob::rejected(input(), params(), "api error 500"),
            Utc::now(),
        );
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.remote_task_id(), 0);
        assert_eq!(job.error_detail(), Some("api error 500"));
    }

    #[test]
    fn test_complete_clears_retry_note() {
        let mut job = SynthesisJob::create(
            1,
            NewSynthesisJob::accepted(input(), params(), 42),
            Utc::now(),
        );
        job.note_retry("Download failed: timeout").unwrap();
        assert_eq!(job.status(), JobStatus::Processing);
        assert!(job.error_detail().is_some());

        job.complete("/files/synthesis_1.mp3").unwrap();
        assert_eq!(job.status(), JobStatus::Success);
        assert_eq!(job.output_path(), Some("/files/synthesis_1.mp3"));
        assert!(job.error_detail().is_none());
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        let mut done = SynthesisJob::create(
            1,
            NewSynthesisJob::accepted(input(), params(), 42),
            Utc::now(),
        );
        done.complete("/files/synthesis_1.mp3").unwrap();
        assert_eq!(
            done.fail("Remote status: Expired"),
            Err(SynthesisError::TerminalState(JobStatus::Success))
        );
        assert!(done.note_retry("late note").is_err());
        assert_eq!(done.status(), JobStatus::Success);

        let mut failed = SynthesisJob::create(
            2,
            NewSynthesisJob::accepted(input(), params(), 43),
            Utc::now(),
        );
        failed.fail("Remote status: Failed").unwrap();
        assert!(failed.complete("/files/synthesis_2.mp3").is_err());
        assert!(failed.output_path().is_none());
        assert_eq!(failed.status(), JobStatus::Failed);
    }
}
