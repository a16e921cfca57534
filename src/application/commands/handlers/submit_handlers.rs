//! Submit Handlers - 提交合成任务 / 上传文本文件

use std::sync::Arc;

use crate::application::commands::handlers::credentials::{
    CredentialResolver, UnknownCredentialPolicy,
};
use crate::application::commands::{SubmitSynthesis, SynthesisMode, UploadTextFile};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStoragePort, CredentialRepositoryPort, ProviderClientFactory,
    SynthesisJobRepositoryPort, SynthesisProviderPort, SynthesisRequest,
};
use crate::domain::synthesis::{
    AudioFormat, NewSynthesisJob, SynthesisInput, SynthesisJob, SynthesisParams,
};

/// 异步合成输入文件的用途标识
pub const TEXT_FILE_PURPOSE: &str = "t2a_async_input";

/// 请求未指定时使用的合成参数
#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub model: String,
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub bitrate: u32,
    pub channels: u8,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            model: "speech-01-turbo".to_string(),
            format: AudioFormat::Mp3,
            sample_rate: 32000,
            bitrate: 128000,
            channels: 1,
        }
    }
}

impl SynthesisDefaults {
    fn params_for(&self, command: &SubmitSynthesis) -> SynthesisParams {
        // 0 与未填写等价
        let non_zero = |v: Option<f64>| v.filter(|v| *v != 0.0).unwrap_or(1.0);

        SynthesisParams {
            voice_id: command.voice_id.trim().to_string(),
            model: command
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.model.clone()),
            format: command.format.unwrap_or(self.format),
            sample_rate: self.sample_rate,
            bitrate: self.bitrate,
            channels: self.channels,
            speed: non_zero(command.speed),
            volume: non_zero(command.volume),
        }
    }
}

// ============================================================================
// SubmitSynthesis
// ============================================================================

/// SubmitSynthesis Handler
///
/// 无论服务商调用成功与否，每次调用都恰好创建一条任务记录
pub struct SubmitSynthesisHandler {
    job_repo: Arc<dyn SynthesisJobRepositoryPort>,
    credentials: CredentialResolver,
    provider_factory: Arc<dyn ProviderClientFactory>,
    storage: Arc<dyn ArtifactStoragePort>,
    defaults: SynthesisDefaults,
}

impl SubmitSynthesisHandler {
    pub fn new(
        job_repo: Arc<dyn SynthesisJobRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        provider_factory: Arc<dyn ProviderClientFactory>,
        storage: Arc<dyn ArtifactStoragePort>,
        defaults: SynthesisDefaults,
    ) -> Self {
        Self {
            job_repo,
            credentials: CredentialResolver::new(credential_repo),
            provider_factory,
            storage,
            defaults,
        }
    }

    pub async fn handle(&self, command: SubmitSynthesis) -> Result<SynthesisJob, ApplicationError> {
        let input = SynthesisInput::new(command.text.clone(), command.text_file_id)?;
        let params = self.defaults.params_for(&command);
        params.validate()?;

        if command.mode == SynthesisMode::Sync && input.text().is_none() {
            return Err(ApplicationError::validation(
                "sync synthesis requires inline text",
            ));
        }

        let credential = self
            .credentials
            .resolve(command.key_id, UnknownCredentialPolicy::Reject)
            .await?;
        let provider = self.provider_factory.client_for(&credential)?;

        let request = SynthesisRequest { input, params };

        match command.mode {
            SynthesisMode::Async => self.submit_async(provider.as_ref(), request).await,
            SynthesisMode::Sync => self.synthesize_now(provider.as_ref(), request).await,
        }
    }

    async fn submit_async(
        &self,
        provider: &dyn SynthesisProviderPort,
        request: SynthesisRequest,
    ) -> Result<SynthesisJob, ApplicationError> {
        let new_job = match provider.submit_async(&request).await {
            Ok(remote_task_id) => {
                NewSynthesisJob::accepted(request.input, request.params, remote_task_id)
            }
            Err(e) => {
                tracing::warn!(
                    voice_id = %request.params.voice_id,
                    error = %e,
                    "Async synthesis submission rejected"
                );
                NewSynthesisJob::rejected(request.input, request.params, e.to_string())
            }
        };

        let job = self.job_repo.create(new_job).await?;

        tracing::info!(
            job_id = job.id(),
            remote_task_id = job.remote_task_id(),
            status = %job.status(),
            "Async synthesis job recorded"
        );

        Ok(job)
    }

    /// 同步合成
    ///
    /// 服务商失败时直接记为 failed；拿到音频后才建 processing 记录，
    /// 以获得由任务 ID 决定的产物路径
    async fn synthesize_now(
        &self,
        provider: &dyn SynthesisProviderPort,
        request: SynthesisRequest,
    ) -> Result<SynthesisJob, ApplicationError> {
        let audio = match provider.synthesize(&request).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(
                    voice_id = %request.params.voice_id,
                    error = %e,
                    "Sync synthesis rejected"
                );
                return Ok(self
                    .job_repo
                    .create(NewSynthesisJob::rejected(
                        request.input,
                        request.params,
                        e.to_string(),
                    ))
                    .await?);
            }
        };

        let mut job = self
            .job_repo
            .create(NewSynthesisJob::local(request.input, request.params))
            .await?;

        match self
            .storage
            .save(job.id(), job.params().format, &audio.audio)
            .await
        {
            Ok(reference) => job.complete(reference)?,
            Err(e) => {
                tracing::warn!(job_id = job.id(), error = %e, "Failed to store sync audio");
                job.fail(format!("Save file failed: {}", e))?;
            }
        }

        self.job_repo.save(&job).await?;

        tracing::info!(
            job_id = job.id(),
            status = %job.status(),
            output = ?job.output_path(),
            audio_length_ms = ?audio.audio_length_ms,
            "Sync synthesis finished"
        );

        Ok(job)
    }
}

// ============================================================================
// UploadTextFile
// ============================================================================

/// 上传结果
#[derive(Debug, Clone)]
pub struct UploadedTextFile {
    pub file_id: i64,
    pub filename: String,
}

/// UploadTextFile Handler - 上传长文本供异步合成引用
pub struct UploadTextFileHandler {
    credentials: CredentialResolver,
    provider_factory: Arc<dyn ProviderClientFactory>,
}

impl UploadTextFileHandler {
    pub fn new(
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        provider_factory: Arc<dyn ProviderClientFactory>,
    ) -> Self {
        Self {
            credentials: CredentialResolver::new(credential_repo),
            provider_factory,
        }
    }

    pub async fn handle(&self, command: UploadTextFile) -> Result<UploadedTextFile, ApplicationError> {
        let extension = std::path::Path::new(&command.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        if !matches!(extension.as_deref(), Some("txt") | Some("zip")) {
            return Err(ApplicationError::validation(
                "Only .txt or .zip text files are allowed",
            ));
        }
        if command.data.is_empty() {
            return Err(ApplicationError::validation("Uploaded file is empty"));
        }

        let credential = self
            .credentials
            .resolve(command.key_id, UnknownCredentialPolicy::Reject)
            .await?;
        let provider = self.provider_factory.client_for(&credential)?;

        let size = command.data.len();
        let file_id = provider
            .upload_file(&command.filename, command.data, TEXT_FILE_PURPOSE)
            .await?;

        tracing::info!(
            file_id = file_id,
            filename = %command.filename,
            size = size,
            "Text file uploaded"
        );

        Ok(UploadedTextFile {
            file_id,
            filename: command.filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Fixture;
    use crate::application::ports::{ProviderError, RepositoryError};
    use crate::domain::synthesis::JobStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_accepted_submission_records_processing_job() {
        let fx = Fixture::new().await;
        fx.provider.set_submit_result(Ok(42));

        let job = fx
            .submit_handler()
            .handle(Fixture::submit_command("hello", "v1"))
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(job.remote_task_id(), 42);
        assert_eq!(job.params().model, "speech-01-turbo");
        assert_eq!(job.params().format, AudioFormat::Mp3);
        assert_eq!(job.params().speed, 1.0);
        assert_eq!(fx.factory.keys_used(), vec![Fixture::API_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_submission_records_failed_job() {
        let fx = Fixture::new().await;
        fx.provider
            .set_submit_result(Err(ProviderError::NetworkError("refused".to_string())));

        let job = fx
            .submit_handler()
            .handle(Fixture::submit_command("hello", "v1"))
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.remote_task_id(), 0);
        assert!(job.error_detail().unwrap().contains("refused"));
        assert!(job.output_path().is_none());
        assert_eq!(fx.job_repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_speed_and_volume_mean_default() {
        let fx = Fixture::new().await;
        let mut command = Fixture::submit_command("hello", "v1");
        command.speed = Some(0.0);
        command.volume = Some(0.0);
        command.format = Some(AudioFormat::Wav);

        let job = fx.submit_handler().handle(command).await.unwrap();
        assert_eq!(job.params().speed, 1.0);
        assert_eq!(job.params().volume, 1.0);
        assert_eq!(job.params().format, AudioFormat::Wav);
    }

    #[tokio::test]
    async fn test_invalid_input_creates_nothing() {
        let fx = Fixture::new().await;

        let empty = fx
            .submit_handler()
            .handle(Fixture::submit_command("   ", "v1"))
            .await;
        assert!(matches!(empty, Err(ApplicationError::ValidationError(_))));

        let mut too_fast = Fixture::submit_command("hello", "v1");
        too_fast.speed = Some(5.0);
        let too_fast = fx.submit_handler().handle(too_fast).await;
        assert!(matches!(too_fast, Err(ApplicationError::ValidationError(_))));

        assert!(fx.job_repo.find_all().await.unwrap().is_empty());
        assert_eq!(fx.provider.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected_on_submit() {
        let fx = Fixture::new().await;
        let mut command = Fixture::submit_command("hello", "v1");
        command.key_id = Some(999);

        let result = fx.submit_handler().handle(command).await;
        match result {
            Err(ApplicationError::CredentialError(message)) => {
                assert_eq!(message, "Invalid API Key ID: 999")
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(fx.provider.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let fx = Fixture::without_credentials().await;
        let result = fx
            .submit_handler()
            .handle(Fixture::submit_command("hello", "v1"))
            .await;
        match result {
            Err(ApplicationError::CredentialError(message)) => {
                assert_eq!(message, "No API Key available")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_file_submission() {
        let fx = Fixture::new().await;
        let command = SubmitSynthesis {
            text_file_id: Some(555),
            voice_id: "v1".to_string(),
            ..Default::default()
        };

        let job = fx.submit_handler().handle(command).await.unwrap();
        assert_eq!(job.input().file_id(), Some(555));
        assert!(job.input().text().is_none());
    }

    #[tokio::test]
    async fn test_sync_mode_completes_immediately() {
        let fx = Fixture::new().await;
        fx.provider.set_synthesize_result(Ok(b"sync-audio".to_vec()));
        let mut command = Fixture::submit_command("hello", "v1");
        command.mode = SynthesisMode::Sync;

        let job = fx.submit_handler().handle(command).await.unwrap();

        assert_eq!(job.status(), JobStatus::Success);
        assert_eq!(job.remote_task_id(), 0);
        let expected = format!("/files/synthesis_{}.mp3", job.id());
        assert_eq!(job.output_path(), Some(expected.as_str()));
        let on_disk = fx.storage_dir().join(format!("synthesis_{}.mp3", job.id()));
        assert_eq!(std::fs::read(on_disk).unwrap(), b"sync-audio");
        assert_eq!(fx.provider.submit_calls(), 0);
    }

    #[tokio::test]
    async fn test_sync_mode_failure_is_recorded() {
        let fx = Fixture::new().await;
        fx.provider.set_synthesize_result(Err(ProviderError::Rejected {
            code: 2013,
            message: "invalid voice".to_string(),
        }));
        let mut command = Fixture::submit_command("hello", "v1");
        command.mode = SynthesisMode::Sync;

        let job = fx.submit_handler().handle(command).await.unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error_detail().unwrap().contains("invalid voice"));

        let stored = fx.job_repo.find_by_id(job.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), JobStatus::Failed);
        assert_eq!(stored.remote_task_id(), 0);
    }

    /// 记录每次写入 Ledger 时的任务状态
    struct RecordingJobRepo {
        inner: Arc<dyn SynthesisJobRepositoryPort>,
        writes: Mutex<Vec<JobStatus>>,
    }

    impl RecordingJobRepo {
        fn new(inner: Arc<dyn SynthesisJobRepositoryPort>) -> Self {
            Self {
                inner,
                writes: Mutex::new(Vec::new()),
            }
        }

        fn writes(&self) -> Vec<JobStatus> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SynthesisJobRepositoryPort for RecordingJobRepo {
        async fn create(&self, job: NewSynthesisJob) -> Result<SynthesisJob, RepositoryError> {
            self.writes.lock().unwrap().push(job.status);
            self.inner.create(job).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<SynthesisJob>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<SynthesisJob>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn save(&self, job: &SynthesisJob) -> Result<(), RepositoryError> {
            self.writes.lock().unwrap().push(job.status());
            self.inner.save(job).await
        }

        async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }
    }

    fn recording_handler(fx: &Fixture, repo: Arc<RecordingJobRepo>) -> SubmitSynthesisHandler {
        SubmitSynthesisHandler::new(
            repo,
            fx.credential_repo.clone(),
            fx.factory.clone(),
            fx.storage.clone(),
            SynthesisDefaults::default(),
        )
    }

    #[tokio::test]
    async fn test_failed_sync_job_never_written_as_processing() {
        let fx = Fixture::new().await;
        fx.provider.set_synthesize_result(Err(ProviderError::InvalidResponse(
            "audio is not hex".to_string(),
        )));
        let repo = Arc::new(RecordingJobRepo::new(fx.job_repo.clone()));
        let mut command = Fixture::submit_command("hello", "v1");
        command.mode = SynthesisMode::Sync;

        let job = recording_handler(&fx, repo.clone())
            .handle(command)
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(repo.writes(), vec![JobStatus::Failed]);
        assert_eq!(fx.provider.synthesize_calls(), 1);
    }

    #[tokio::test]
    async fn test_sync_job_row_created_after_audio_arrives() {
        let fx = Fixture::new().await;
        fx.provider.set_synthesize_result(Ok(b"sync-audio".to_vec()));
        let repo = Arc::new(RecordingJobRepo::new(fx.job_repo.clone()));
        let mut command = Fixture::submit_command("hello", "v1");
        command.mode = SynthesisMode::Sync;

        let job = recording_handler(&fx, repo.clone())
            .handle(command)
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Success);
        assert_eq!(
            repo.writes(),
            vec![JobStatus::Processing, JobStatus::Success]
        );
    }

    #[tokio::test]
    async fn test_sync_mode_requires_text() {
        let fx = Fixture::new().await;
        let command = SubmitSynthesis {
            text_file_id: Some(555),
            voice_id: "v1".to_string(),
            mode: SynthesisMode::Sync,
            ..Default::default()
        };

        let result = fx.submit_handler().handle(command).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_upload_text_file() {
        let fx = Fixture::new().await;
        fx.provider.set_upload_file_id(9876);
        let handler = UploadTextFileHandler::new(fx.credential_repo.clone(), fx.factory.clone());

        let uploaded = handler
            .handle(UploadTextFile {
                filename: "Book.TXT".to_string(),
                data: b"long text".to_vec(),
                key_id: None,
            })
            .await
            .unwrap();
        assert_eq!(uploaded.file_id, 9876);

        let rejected = handler
            .handle(UploadTextFile {
                filename: "book.pdf".to_string(),
                data: b"x".to_vec(),
                key_id: None,
            })
            .await;
        assert!(matches!(rejected, Err(ApplicationError::ValidationError(_))));
        assert_eq!(fx.provider.upload_calls(), 1);
    }
}
