//! HTTP Provider Client - 调用远程语音合成服务
//!
//! 实现 SynthesisProviderPort trait
//!
//! 远程 API:
//! POST {base}/t2a_async_v2                       提交异步任务
//! GET  {base}/query/t2a_async_query_v2?task_id=  查询任务
//! GET  {base}/files/retrieve?file_id=            文件元数据
//! POST {base}/t2a_v2                             同步合成（hex 音频）
//! POST {base}/files/upload?purpose=              上传文本文件

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use super::wire::{
    AsyncQueryResponse, AsyncSubmitResponse, Envelope, FileRetrieveResponse, SyncResponse,
    T2aRequest, UploadResponse,
};
use crate::application::ports::{
    Credential, DownloadedPayload, ProviderClientFactory, ProviderError, RemoteFile,
    RemoteTaskState, RemoteTaskStatus, SynthesisProviderPort, SynthesisRequest,
    SynthesizedAudio,
};

/// HTTP Provider 客户端配置
#[derive(Debug, Clone)]
pub struct HttpProviderClientConfig {
    /// 服务商 API 基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpProviderClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.minimaxi.com/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpProviderClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 按凭证创建客户端，所有客户端共享同一个连接池
pub struct HttpProviderFactory {
    client: Client,
    base_url: Arc<str>,
}

impl HttpProviderFactory {
    pub fn new(config: HttpProviderClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
        })
    }
}

impl ProviderClientFactory for HttpProviderFactory {
    fn client_for(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn SynthesisProviderPort>, ProviderError> {
        Ok(Arc::new(HttpProviderClient {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: credential.key.clone(),
        }))
    }
}

/// HTTP Provider 客户端，绑定一个 API Key
pub struct HttpProviderClient {
    client: Client,
    base_url: Arc<str>,
    api_key: String,
}

impl HttpProviderClient {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// 发送请求并解析带 base_resp 的 JSON 响应
    async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Envelope,
    {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: T = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parsed.check()?;

        Ok(parsed)
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::NetworkError(format!("Cannot connect to provider: {}", e))
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl SynthesisProviderPort for HttpProviderClient {
    async fn submit_async(&self, request: &SynthesisRequest) -> Result<i64, ProviderError> {
        let body = T2aRequest::from_request(request);

        tracing::debug!(
            model = body.model,
            voice_id = body.voice_setting.voice_id,
            text_len = body.text.len(),
            text_file_id = ?body.text_file_id,
            "Submitting async synthesis"
        );

        let response: AsyncSubmitResponse = self
            .send_json(self.client.post(self.url("/t2a_async_v2")).json(&body))
            .await?;

        if response.task_id <= 0 {
            return Err(ProviderError::InvalidResponse(
                "missing task_id in submit response".to_string(),
            ));
        }

        Ok(response.task_id)
    }

    async fn query_status(&self, remote_task_id: i64) -> Result<RemoteTaskState, ProviderError> {
        let response: AsyncQueryResponse = self
            .send_json(
                self.client
                    .get(self.url("/query/t2a_async_query_v2"))
                    .query(&[("task_id", remote_task_id)]),
            )
            .await?;

        Ok(RemoteTaskState {
            status: RemoteTaskStatus::parse(&response.status),
            file_id: response.file_id,
        })
    }

    async fn retrieve_file(&self, file_id: i64) -> Result<RemoteFile, ProviderError> {
        let response: FileRetrieveResponse = self
            .send_json(
                self.client
                    .get(self.url("/files/retrieve"))
                    .query(&[("file_id", file_id)]),
            )
            .await?;

        let download_url = response
            .file
            .map(|f| f.download_url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("missing download_url".to_string()))?;

        Ok(RemoteFile {
            file_id,
            download_url,
        })
    }

    async fn download(&self, url: &str) -> Result<DownloadedPayload, ProviderError> {
        // 下载地址为预签名 URL，不携带凭证
        let response = self.client.get(url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        tracing::debug!(
            size = body.len(),
            content_type = ?content_type,
            "Downloaded provider file"
        );

        Ok(DownloadedPayload {
            content_type,
            body: body.to_vec(),
        })
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, ProviderError> {
        let body = T2aRequest::from_request(request);

        let response: SyncResponse = self
            .send_json(self.client.post(self.url("/t2a_v2")).json(&body))
            .await?;

        let encoded = response
            .data
            .map(|d| d.audio)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("empty audio in response".to_string()))?;

        let audio = hex::decode(encoded.trim())
            .map_err(|e| ProviderError::InvalidResponse(format!("audio is not hex: {}", e)))?;

        Ok(SynthesizedAudio {
            audio,
            audio_length_ms: response.extra_info.and_then(|e| e.audio_length),
        })
    }

    async fn upload_file(
        &self,
        filename: &str,
        data: Vec<u8>,
        purpose: &str,
    ) -> Result<i64, ProviderError> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response: UploadResponse = self
            .send_json(
                self.client
                    .post(self.url("/files/upload"))
                    .query(&[("purpose", purpose)])
                    .multipart(form),
            )
            .await?;

        response
            .file_id()
            .ok_or_else(|| ProviderError::InvalidResponse("missing file_id".to_string()))
    }
}
