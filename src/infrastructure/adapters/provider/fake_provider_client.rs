//! Fake Provider Client - 本地联调与测试用的服务商实现
//!
//! 不发起任何网络请求，按脚本返回结果并统计调用次数

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{
    Credential, DownloadedPayload, ProviderClientFactory, ProviderError, RemoteFile,
    RemoteTaskState, RemoteTaskStatus, SynthesisProviderPort, SynthesisRequest,
    SynthesizedAudio,
};

/// 脚本化的服务商行为
#[derive(Debug, Clone)]
struct Script {
    submit_result: Result<i64, ProviderError>,
    status: RemoteTaskStatus,
    file_id: i64,
    download: DownloadedPayload,
    download_delay: Duration,
    failing_downloads: usize,
    fail_retrieve: bool,
    fail_query: bool,
    synthesize_result: Result<Vec<u8>, ProviderError>,
    upload_file_id: i64,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            submit_result: Ok(1),
            status: RemoteTaskStatus::Success,
            file_id: 1,
            download: DownloadedPayload {
                content_type: Some("audio/mpeg".to_string()),
                body: b"fake-audio".to_vec(),
            },
            download_delay: Duration::ZERO,
            failing_downloads: 0,
            fail_retrieve: false,
            fail_query: false,
            synthesize_result: Ok(b"fake-audio".to_vec()),
            upload_file_id: 1,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    submit: AtomicUsize,
    query: AtomicUsize,
    retrieve: AtomicUsize,
    download: AtomicUsize,
    synthesize: AtomicUsize,
    upload: AtomicUsize,
}

/// Fake Provider Client
///
/// 默认行为：提交成功、远程立即完成、下载返回固定字节
#[derive(Debug, Default)]
pub struct FakeProviderClient {
    script: Mutex<Script>,
    counters: Counters,
    retrieved_file_ids: Mutex<Vec<i64>>,
}

impl FakeProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> Script {
        self.script
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn update(&self, f: impl FnOnce(&mut Script)) {
        if let Ok(mut script) = self.script.lock() {
            f(&mut script);
        }
    }

    pub fn set_submit_result(&self, result: Result<i64, ProviderError>) {
        self.update(|s| s.submit_result = result);
    }

    pub fn set_status(&self, status: RemoteTaskStatus, file_id: i64) {
        self.update(|s| {
            s.status = status;
            s.file_id = file_id;
        });
    }

    pub fn set_download(&self, content_type: Option<&str>, body: Vec<u8>) {
        let content_type = content_type.map(str::to_string);
        self.update(|s| s.download = DownloadedPayload { content_type, body });
    }

    pub fn set_download_delay(&self, delay: Duration) {
        self.update(|s| s.download_delay = delay);
    }

    /// 接下来的 n 次下载返回错误
    pub fn fail_next_downloads(&self, n: usize) {
        self.update(|s| s.failing_downloads = n);
    }

    pub fn fail_retrieve(&self, fail: bool) {
        self.update(|s| s.fail_retrieve = fail);
    }

    pub fn fail_query(&self, fail: bool) {
        self.update(|s| s.fail_query = fail);
    }

    pub fn set_synthesize_result(&self, result: Result<Vec<u8>, ProviderError>) {
        self.update(|s| s.synthesize_result = result);
    }

    pub fn set_upload_file_id(&self, file_id: i64) {
        self.update(|s| s.upload_file_id = file_id);
    }

    pub fn submit_calls(&self) -> usize {
        self.counters.submit.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.counters.query.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.counters.retrieve.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.counters.download.load(Ordering::SeqCst)
    }

    pub fn synthesize_calls(&self) -> usize {
        self.counters.synthesize.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.counters.upload.load(Ordering::SeqCst)
    }

    pub fn retrieved_file_ids(&self) -> Vec<i64> {
        self.retrieved_file_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SynthesisProviderPort for FakeProviderClient {
    async fn submit_async(&self, request: &SynthesisRequest) -> Result<i64, ProviderError> {
        self.counters.submit.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            voice_id = %request.params.voice_id,
            "FakeProviderClient: submit"
        );
        self.script().submit_result
    }

    async fn query_status(&self, remote_task_id: i64) -> Result<RemoteTaskState, ProviderError> {
        self.counters.query.fetch_add(1, Ordering::SeqCst);
        let script = self.script();
        if script.fail_query {
            return Err(ProviderError::NetworkError(format!(
                "query for task {} refused",
                remote_task_id
            )));
        }
        Ok(RemoteTaskState {
            status: script.status,
            file_id: script.file_id,
        })
    }

    async fn retrieve_file(&self, file_id: i64) -> Result<RemoteFile, ProviderError> {
        self.counters.retrieve.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ids) = self.retrieved_file_ids.lock() {
            ids.push(file_id);
        }
        if self.script().fail_retrieve {
            return Err(ProviderError::Rejected {
                code: 1004,
                message: "file not accessible".to_string(),
            });
        }
        Ok(RemoteFile {
            file_id,
            download_url: format!("fake://files/{}", file_id),
        })
    }

    async fn download(&self, url: &str) -> Result<DownloadedPayload, ProviderError> {
        self.counters.download.fetch_add(1, Ordering::SeqCst);
        let script = self.script();

        if !script.download_delay.is_zero() {
            tokio::time::sleep(script.download_delay).await;
        }

        if script.failing_downloads > 0 {
            self.update(|s| s.failing_downloads = s.failing_downloads.saturating_sub(1));
            return Err(ProviderError::HttpStatus {
                status: 503,
                body: format!("{} unavailable", url),
            });
        }

        Ok(script.download)
    }

    async fn synthesize(&self, _request: &SynthesisRequest) -> Result<SynthesizedAudio, ProviderError> {
        self.counters.synthesize.fetch_add(1, Ordering::SeqCst);
        let audio = self.script().synthesize_result?;
        Ok(SynthesizedAudio {
            audio,
            audio_length_ms: None,
        })
    }

    async fn upload_file(
        &self,
        filename: &str,
        data: Vec<u8>,
        purpose: &str,
    ) -> Result<i64, ProviderError> {
        self.counters.upload.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            filename = %filename,
            size = data.len(),
            purpose = %purpose,
            "FakeProviderClient: upload"
        );
        Ok(self.script().upload_file_id)
    }
}

/// 所有凭证共享同一个 FakeProviderClient，并记录使用过的 Key
#[derive(Debug, Default)]
pub struct FakeProviderFactory {
    client: Arc<FakeProviderClient>,
    keys_used: Mutex<Vec<String>>,
}

impl FakeProviderFactory {
    pub fn new(client: Arc<FakeProviderClient>) -> Self {
        Self {
            client,
            keys_used: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> Arc<FakeProviderClient> {
        self.client.clone()
    }

    pub fn keys_used(&self) -> Vec<String> {
        self.keys_used
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }
}

impl ProviderClientFactory for FakeProviderFactory {
    fn client_for(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn SynthesisProviderPort>, ProviderError> {
        if let Ok(mut keys) = self.keys_used.lock() {
            keys.push(credential.key.clone());
        }
        Ok(self.client.clone())
    }
}
