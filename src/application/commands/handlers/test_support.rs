//! Handler 测试夹具：内存 SQLite + 临时目录存储 + Fake 服务商

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use super::{
    CheckSynthesisStatusHandler, DeleteSynthesisHandler, SubmitSynthesisHandler,
    SynthesisDefaults,
};
use crate::application::commands::SubmitSynthesis;
use crate::application::ports::{
    CredentialRepositoryPort, NewCredential, SynthesisJobRepositoryPort,
};
use crate::domain::synthesis::{
    AudioFormat, NewSynthesisJob, SynthesisInput, SynthesisJob, SynthesisParams,
};
use crate::infrastructure::adapters::{
    FakeProviderClient, FakeProviderFactory, FileArtifactStorage,
};
use crate::infrastructure::memory::InMemoryJobLockRegistry;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCredentialRepository,
    SqliteSynthesisJobRepository,
};

pub struct Fixture {
    pub job_repo: Arc<dyn SynthesisJobRepositoryPort>,
    pub credential_repo: Arc<dyn CredentialRepositoryPort>,
    pub provider: Arc<FakeProviderClient>,
    pub factory: Arc<FakeProviderFactory>,
    pub storage: Arc<FileArtifactStorage>,
    pub locks: Arc<InMemoryJobLockRegistry>,
    _dir: TempDir,
}

impl Fixture {
    pub const API_KEY: &'static str = "sk-default-key-0001";

    /// 带一个默认凭证
    pub async fn new() -> Self {
        let fx = Self::without_credentials().await;
        fx.credential_repo
            .create(NewCredential {
                platform: "minimax".to_string(),
                key: Self::API_KEY.to_string(),
                is_default: true,
            })
            .await
            .unwrap();
        fx
    }

    pub async fn without_credentials() -> Self {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let dir = TempDir::new().unwrap();
        let storage = FileArtifactStorage::new(dir.path().join("files"), "/files")
            .await
            .unwrap();

        let provider = Arc::new(FakeProviderClient::new());
        let factory = Arc::new(FakeProviderFactory::new(provider.clone()));

        Self {
            job_repo: Arc::new(SqliteSynthesisJobRepository::new(pool.clone())),
            credential_repo: Arc::new(SqliteCredentialRepository::new(pool)),
            provider,
            factory,
            storage: Arc::new(storage),
            locks: Arc::new(InMemoryJobLockRegistry::new()),
            _dir: dir,
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage.base_dir().to_path_buf()
    }

    pub fn submit_handler(&self) -> SubmitSynthesisHandler {
        SubmitSynthesisHandler::new(
            self.job_repo.clone(),
            self.credential_repo.clone(),
            self.factory.clone(),
            self.storage.clone(),
            SynthesisDefaults::default(),
        )
    }

    pub fn check_handler(&self) -> CheckSynthesisStatusHandler {
        CheckSynthesisStatusHandler::new(
            self.job_repo.clone(),
            self.credential_repo.clone(),
            self.factory.clone(),
            self.storage.clone(),
            self.locks.clone(),
        )
    }

    pub fn delete_handler(&self) -> DeleteSynthesisHandler {
        DeleteSynthesisHandler::new(
            self.job_repo.clone(),
            self.storage.clone(),
            self.locks.clone(),
        )
    }

    pub fn submit_command(text: &str, voice_id: &str) -> SubmitSynthesis {
        SubmitSynthesis {
            text: Some(text.to_string()),
            voice_id: voice_id.to_string(),
            ..Default::default()
        }
    }

    pub fn params() -> SynthesisParams {
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

    /// 已被服务商受理、处于 processing 的任务
    pub async fn accepted_job(&self, remote_task_id: i64) -> SynthesisJob {
        self.job_repo
            .create(NewSynthesisJob::accepted(
                Self::input(),
                Self::params(),
                remote_task_id,
            ))
            .await
            .unwrap()
    }

    /// 本地执行、没有 remote_task_id 的任务
    pub async fn local_job(&self) -> SynthesisJob {
        self.job_repo
            .create(NewSynthesisJob::local(Self::input(), Self::params()))
            .await
            .unwrap()
    }
}
