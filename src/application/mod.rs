//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SynthesisProvider、Repository、ArtifactStorage、JobLockRegistry）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Synthesis commands
    CheckSynthesisStatus,
    DeleteSynthesis,
    SubmitSynthesis,
    SynthesisMode,
    UploadTextFile,
    // Credential commands
    AddCredential,
    DeleteCredential,
    SetDefaultCredential,
    // Handlers
    handlers::{
        AddCredentialHandler, CheckSynthesisStatusHandler, DeleteCredentialHandler,
        DeleteSynthesisHandler, RemoteOutcome, SetDefaultCredentialHandler, SubmitSynthesisHandler, SynthesisDefaults,
        UploadTextFileHandler, UploadedTextFile,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Artifact storage
    ArtifactStorageError,
    ArtifactStoragePort,
    // Job locks
    JobLockRegistryPort,
    // Provider
    ProviderClientFactory,
    ProviderError,
    RemoteTaskStatus,
    SynthesisProviderPort,
    // Repositories
    Credential,
    CredentialRepositoryPort,
    RepositoryError,
    SynthesisJobRepositoryPort,
};

pub use queries::{
    // Synthesis queries
    GetSynthesisAudio,
    GetSynthesisJob,
    ListSynthesisJobs,
    SynthesisAudioFile,
    // Credential queries
    ListCredentials,
    // Handlers
    handlers::{
        CredentialSummary, GetSynthesisAudioHandler, GetSynthesisJobHandler,
        ListCredentialsHandler, ListSynthesisJobsHandler,
    },
};
