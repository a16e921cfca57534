//! Synthesis Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArtifactStoragePort, SynthesisJobRepositoryPort};
use crate::application::queries::{
    GetSynthesisAudio, GetSynthesisJob, ListSynthesisJobs, SynthesisAudioFile,
};
use crate::domain::synthesis::SynthesisJob;

/// GetSynthesisJob Handler
pub struct GetSynthesisJobHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
}

impl GetSynthesisJobHandler {
    pub fn new(job_repo: Arc<dyn SynthesisJobRepositoryPort>) -> Self {
        Self { job_repo }
    }

    pub async fn handle(&self, query: GetSynthesisJob) -> Result<SynthesisJob, ApplicationError> {
        self.job_repo
            .find_by_id(query.job_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", query.job_id))
    }
}

/// ListSynthesisJobs Handler
pub struct ListSynthesisJobsHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
}

impl ListSynthesisJobsHandler {
    pub fn new(job_repo: Arc<dyn SynthesisJobRepositoryPort>) -> Self {
        Self { job_repo }
    }

    pub async fn handle(&self, _query: ListSynthesisJobs) -> Result<Vec<SynthesisJob>, ApplicationError> {
        Ok(self.job_repo.find_all().await?)
    }
}

/// GetSynthesisAudio Handler - 定位已完成任务的音频文件
pub struct GetSynthesisAudioHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
    storage: Arc<dyn ArtifactStoragePort>,
}

impl GetSynthesisAudioHandler {
    pub fn new(
        job_repo: Arc<dyn SynthesisJobRepositoryPort>,
        storage: Arc<dyn ArtifactStoragePort>,
    ) -> Self {
        Self { job_repo, storage }
    }

    pub async fn handle(&self, query: GetSynthesisAudio) -> Result<SynthesisAudioFile, ApplicationError> {
        let job = self
            .job_repo
            .find_by_id(query.job_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Task", query.job_id))?;

        let reference = job.output_path().ok_or_else(|| {
            ApplicationError::invalid_operation(format!(
                "Task {} has no audio (status: {})",
                job.id(),
                job.status()
            ))
        })?;

        let path = self.storage.resolve(reference)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ApplicationError::not_found("Audio file", job.id()));
        }

        let format = job.params().format;
        Ok(SynthesisAudioFile {
            file_name: format!("synthesis_{}.{}", job.id(), format.extension()),
            path,
            content_type: format.mime_type(),
        })
    }
}
