//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddCredentialHandler, CheckSynthesisStatusHandler, DeleteCredentialHandler,
    DeleteSynthesisHandler, SetDefaultCredentialHandler, SubmitSynthesisHandler, SynthesisDefaults, UploadTextFileHandler,
    // Query handlers
    GetSynthesisAudioHandler, GetSynthesisJobHandler, ListCredentialsHandler,
    ListSynthesisJobsHandler,
    // Ports
    ArtifactStoragePort, CredentialRepositoryPort, JobLockRegistryPort, ProviderClientFactory,
    SynthesisJobRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub submit_synthesis_handler: SubmitSynthesisHandler,
    pub check_status_handler: CheckSynthesisStatusHandler,
    pub delete_synthesis_handler: DeleteSynthesisHandler,
    pub upload_text_file_handler: UploadTextFileHandler,
    pub add_credential_handler: AddCredentialHandler,
    pub set_default_credential_handler: SetDefaultCredentialHandler,
    pub delete_credential_handler: DeleteCredentialHandler,

    // ========== Query Handlers ==========
    pub get_synthesis_handler: GetSynthesisJobHandler,
    pub list_synthesis_handler: ListSynthesisJobsHandler,
    pub get_synthesis_audio_handler: GetSynthesisAudioHandler,
    pub list_credentials_handler: ListCredentialsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        job_repo: Arc<dyn SynthesisJobRepositoryPort>,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
        provider_factory: Arc<dyn ProviderClientFactory>,
        storage: Arc<dyn ArtifactStoragePort>,
        locks: Arc<dyn JobLockRegistryPort>,
        defaults: SynthesisDefaults,
    ) -> Self {
        Self {
            // Command handlers
            submit_synthesis_handler: SubmitSynthesisHandler::new(
                job_repo.clone(),
                credential_repo.clone(),
                provider_factory.clone(),
                storage.clone(),
                defaults,
            ),
            check_status_handler: CheckSynthesisStatusHandler::new(
                job_repo.clone(),
                credential_repo.clone(),
                provider_factory.clone(),
                storage.clone(),
                locks.clone(),
            ),
            delete_synthesis_handler: DeleteSynthesisHandler::new(
                job_repo.clone(),
                storage.clone(),
                locks,
            ),
            upload_text_file_handler: UploadTextFileHandler::new(
                credential_repo.clone(),
                provider_factory,
            ),
            add_credential_handler: AddCredentialHandler::new(credential_repo.clone()),
            set_default_credential_handler: SetDefaultCredentialHandler::new(
                credential_repo.clone(),
            ),
            delete_credential_handler: DeleteCredentialHandler::new(credential_repo.clone()),

            // Query handlers
            get_synthesis_handler: GetSynthesisJobHandler::new(job_repo.clone()),
            list_synthesis_handler: ListSynthesisJobsHandler::new(job_repo.clone()),
            get_synthesis_audio_handler: GetSynthesisAudioHandler::new(job_repo, storage),
            list_credentials_handler: ListCredentialsHandler::new(credential_repo),
        }
    }
}
