//! DeleteSynthesis Handler

use std::sync::Arc;

use crate::application::commands::DeleteSynthesis;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStoragePort, JobLockRegistryPort, SynthesisJobRepositoryPort,
};

/// DeleteSynthesis Handler
///
/// 与状态检查共用任务锁，避免删除与下载交错
pub struct DeleteSynthesisHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
    storage: Arc<dyn ArtifactStoragePort>,
    locks: Arc<dyn JobLockRegistryPort>,
}

impl DeleteSynthesisHandler {
    pub fn new(
        job_repo: Arc<dyn SynthesisJobRepositoryPort>,
        storage: Arc<dyn ArtifactStoragePort>,
        locks: Arc<dyn JobLockRegistryPort>,
    ) -> Self {
        Self {
            job_repo,
            storage,
            locks,
        }
    }

    pub async fn handle(&self, command: DeleteSynthesis) -> Result<(), ApplicationError> {
        let job_id = command.job_id;

        // 不存在的 ID 不进入锁注册表
        if self.job_repo.find_by_id(job_id).await?.is_none() {
            return Err(ApplicationError::not_found("Task", job_id));
        }

        let lock = self.locks.lock_for(job_id);
        let _guard = lock.lock().await;

        // 等锁期间可能已被并发删除
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", job_id))?;

        // 先删文件：文件删除失败时保留记录，可以重试
        let removed = match job.output_path() {
            Some(reference) => self.storage.remove(reference).await?,
            None => false,
        };

        self.job_repo.delete(job_id).await?;

        tracing::info!(
            job_id = job_id,
            status = %job.status(),
            artifact_removed = removed,
            "Synthesis job deleted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Fixture;
    use crate::application::commands::CheckSynthesisStatus;
    use crate::application::ports::RemoteTaskStatus;

    #[tokio::test]
    async fn test_delete_removes_row_and_artifact() {
        let fx = Fixture::new().await;
        let job = fx.accepted_job(42).await;
        fx.provider.set_status(RemoteTaskStatus::Success, 7);
        fx.provider.set_download(Some("audio/mpeg"), b"mp3-bytes".to_vec());

        let done = fx
            .check_handler()
            .handle(CheckSynthesisStatus {
                job_id: job.id(),
                key_id: None,
            })
            .await
            .unwrap();
        let on_disk = fx.storage_dir().join(format!("synthesis_{}.mp3", done.id()));
        assert!(on_disk.exists());

        fx.delete_handler()
            .handle(DeleteSynthesis { job_id: job.id() })
            .await
            .unwrap();

        assert!(!on_disk.exists());
        assert!(fx.job_repo.find_by_id(job.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_without_artifact() {
        let fx = Fixture::new().await;
        let job = fx.accepted_job(42).await;

        fx.delete_handler()
            .handle(DeleteSynthesis { job_id: job.id() })
            .await
            .unwrap();

        assert!(fx.job_repo.find_by_id(job.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_job() {
        let fx = Fixture::new().await;
        let result = fx.delete_handler().handle(DeleteSynthesis { job_id: 77 }).await;
        assert!(matches!(result, Err(ApplicationError::NotFound { id: 77, .. })));
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_lock_registry_empty() {
        let fx = Fixture::new().await;
        let handler = fx.delete_handler();

        for job_id in 1000..1050 {
            let result = handler.handle(DeleteSynthesis { job_id }).await;
            assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
        }

        assert_eq!(fx.locks.len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_deletes_remove_once() {
        let fx = Fixture::new().await;
        let job = fx.accepted_job(42).await;
        let handler = Arc::new(fx.delete_handler());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let handler = handler.clone();
            let job_id = job.id();
            handles.push(tokio::spawn(async move {
                handler.handle(DeleteSynthesis { job_id }).await
            }));
        }

        let mut deleted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => deleted += 1,
                Err(ApplicationError::NotFound { .. }) => {}
                Err(e) => panic!("unexpected: {:?}", e),
            }
        }

        assert_eq!(deleted, 1);
        assert!(fx.job_repo.find_by_id(job.id()).await.unwrap().is_none());
    }
}
