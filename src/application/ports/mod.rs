//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_storage;
mod job_locks;
mod provider;
mod repositories;

pub use artifact_storage::{ArtifactStorageError, ArtifactStoragePort};
pub use job_locks::JobLockRegistryPort;
pub use provider::{
    DownloadedPayload, ProviderClientFactory, ProviderError, RemoteFile, RemoteTaskState,
    RemoteTaskStatus, SynthesisProviderPort, SynthesisRequest, SynthesizedAudio,
};
pub use repositories::{
    Credential, CredentialRepositoryPort, NewCredential, RepositoryError,
    SynthesisJobRepositoryPort,
};
