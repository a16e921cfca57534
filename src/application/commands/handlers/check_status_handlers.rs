//! CheckSynthesisStatus Handler - 轮询远程任务并取回产物
//!
//! 同一任务的检查流程由任务锁串行化：
//! 1. 终态直接返回（无锁、无远程调用）
//! 2. 获取任务锁后重新读取，若已被并发检查者完成则直接返回
//! 3. 查询远程状态；Success 时下载产物，下载失败只记录说明、保持 processing
//!
//! 锁在整个远程调用与写盘期间持有，保证每个任务至多一次成功下载。

use std::sync::Arc;

use crate::application::commands::handlers::credentials::{
    CredentialResolver, UnknownCredentialPolicy,
};
use crate::application::commands::handlers::retrieval::ArtifactRetriever;
use crate::application::commands::CheckSynthesisStatus;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStoragePort, CredentialRepositoryPort, JobLockRegistryPort, ProviderClientFactory,
    RemoteTaskState, RemoteTaskStatus, SynthesisJobRepositoryPort, SynthesisProviderPort,
};
use crate::domain::synthesis::SynthesisJob;

/// 一次远程检查的结果
///
/// 可重试的下载失败以 Retry 表示，而不是走错误通道
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    /// 产物已落盘
    Completed(String),
    /// 远程任务失败或过期
    Failed(String),
    /// 远程仍在处理
    Pending,
    /// 远程已完成但取回失败，下次轮询重试
    Retry(String),
}

/// CheckSynthesisStatus Handler
pub struct CheckSynthesisStatusHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
    credentials: CredentialResolver,
    provider_factory: Arc<dyn ProviderClientFactory>,
    retriever: ArtifactRetriever,
    locks: Arc<dyn JobLockRegistryPort>,
}

impl CheckSynthesisStatusHandler {
    pub fn new(
        job_repo: Arc<dyn SynthesisJobRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        provider_factory: Arc<dyn ProviderClientFactory>,
        storage: Arc<dyn ArtifactStoragePort>,
        locks: Arc<dyn JobLockRegistryPort>,
    ) -> Self {
        Self {
            job_repo,
            credentials: CredentialResolver::new(credential_repo),
            provider_factory,
            retriever: ArtifactRetriever::new(storage),
            locks,
        }
    }

    pub async fn handle(&self, command: CheckSynthesisStatus) -> Result<SynthesisJob, ApplicationError> {
        let job = self.load(command.job_id).await?;
        if job.is_terminal() {
            return Ok(job);
        }

        let lock = self.locks.lock_for(command.job_id);
        let _guard = lock.lock().await;

        // 等锁期间可能已被其它检查者完成
        let mut job = self.load(command.job_id).await?;
        if job.is_terminal() {
            tracing::debug!(
                job_id = job.id(),
                status = %job.status(),
                "Job completed by a concurrent check"
            );
            return Ok(job);
        }

        if !job.is_remote_tracked() {
            return Err(ApplicationError::invalid_operation("Not an async task"));
        }

        let credential = self
            .credentials
            .resolve(command.key_id, UnknownCredentialPolicy::Fallback)
            .await?;
        let provider = self.provider_factory.client_for(&credential)?;

        let remote = provider
            .query_status(job.remote_task_id())
            .await
            .map_err(|e| ApplicationError::RemoteProviderError(format!("Query Failed: {}", e)))?;

        tracing::debug!(
            job_id = job.id(),
            remote_task_id = job.remote_task_id(),
            remote_status = remote.status.as_str(),
            "Remote task status fetched"
        );

        let outcome = self.resolve_outcome(provider.as_ref(), &job, remote).await;
        apply_outcome(&mut job, outcome)?;

        self.job_repo.save(&job).await?;

        Ok(job)
    }

    async fn load(&self, job_id: i64) -> Result<SynthesisJob, ApplicationError> {
        self.job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", job_id))
    }

    async fn resolve_outcome(
        &self,
        provider: &dyn SynthesisProviderPort,
        job: &SynthesisJob,
        remote: RemoteTaskState,
    ) -> RemoteOutcome {
        match remote.status {
            RemoteTaskStatus::Success => {
                match self.retriever.retrieve(provider, job, remote.file_id).await {
                    Ok(reference) => RemoteOutcome::Completed(reference),
                    Err(e) => {
                        tracing::warn!(
                            job_id = job.id(),
                            file_id = remote.file_id,
                            error = %e,
                            "Artifact retrieval failed, will retry on next poll"
                        );
                        RemoteOutcome::Retry(retry_note(e))
                    }
                }
            }
            RemoteTaskStatus::Failed | RemoteTaskStatus::Expired => {
                RemoteOutcome::Failed(format!("Remote status: {}", remote.status.as_str()))
            }
            RemoteTaskStatus::Processing | RemoteTaskStatus::Unknown(_) => RemoteOutcome::Pending,
        }
    }
}

fn apply_outcome(job: &mut SynthesisJob, outcome: RemoteOutcome) -> Result<(), ApplicationError> {
    match outcome {
        RemoteOutcome::Completed(reference) => {
            job.complete(reference)?;
            tracing::info!(job_id = job.id(), output = ?job.output_path(), "Synthesis job succeeded");
        }
        RemoteOutcome::Failed(detail) => {
            job.fail(detail)?;
            tracing::info!(job_id = job.id(), error = ?job.error_detail(), "Synthesis job failed");
        }
        RemoteOutcome::Retry(note) => job.note_retry(note)?,
        RemoteOutcome::Pending => {}
    }
    Ok(())
}

fn retry_note(err: ApplicationError) -> String {
    match err {
        ApplicationError::RetrievalError(message) => message,
        other => other.to_string(),
    }
}
