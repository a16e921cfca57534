//! Provider wire format
//!
//! 所有响应都带 base_resp，status_code != 0 即业务失败

use serde::{Deserialize, Deserializer, Serialize};

use crate::application::ports::{ProviderError, SynthesisRequest};

#[derive(Debug, Serialize)]
pub(super) struct T2aRequest<'a> {
    pub model: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_file_id: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    pub voice_setting: VoiceSetting<'a>,
    pub audio_setting: AudioSetting<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct VoiceSetting<'a> {
    pub voice_id: &'a str,
    pub speed: f64,
    pub vol: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct AudioSetting<'a> {
    pub sample_rate: u32,
    pub bitrate: u32,
    pub format: &'a str,
    pub channel: u8,
}

impl<'a> T2aRequest<'a> {
    pub fn from_request(request: &'a SynthesisRequest) -> Self {
        let params = &request.params;
        Self {
            model: &params.model,
            text: request.input.text().unwrap_or_default(),
            text_file_id: request.input.file_id(),
            stream: false,
            voice_setting: VoiceSetting {
                voice_id: &params.voice_id,
                speed: params.speed,
                vol: params.volume,
            },
            audio_setting: AudioSetting {
                sample_rate: params.sample_rate,
                bitrate: params.bitrate,
                format: params.format.as_str(),
                channel: params.channels,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct BaseResp {
    #[serde(default)]
    pub status_code: i64,
    #[serde(default)]
    pub status_msg: String,
}

/// 带 base_resp 的响应
pub(super) trait Envelope {
    fn base_resp(&self) -> Option<&BaseResp>;

    fn check(&self) -> Result<(), ProviderError> {
        match self.base_resp() {
            Some(base) if base.status_code != 0 => Err(ProviderError::Rejected {
                code: base.status_code,
                message: base.status_msg.clone(),
            }),
            _ => Ok(()),
        }
    }
}

macro_rules! envelope {
    ($($ty:ty),* $(,)?) => {
        $(impl Envelope for $ty {
            fn base_resp(&self) -> Option<&BaseResp> {
                self.base_resp.as_ref()
            }
        })*
    };
}

#[derive(Debug, Deserialize)]
pub(super) struct AsyncSubmitResponse {
    #[serde(default)]
    pub task_id: i64,
    pub base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AsyncQueryResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file_id: i64,
    pub base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileRetrieveResponse {
    pub file: Option<FileObject>,
    pub base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileObject {
    #[serde(default, deserialize_with = "flexible_id")]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncResponse {
    pub data: Option<SyncData>,
    pub extra_info: Option<ExtraInfo>,
    pub base_resp: Option<BaseResp>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SyncData {
    /// hex 编码的音频
    #[serde(default)]
    pub audio: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExtraInfo {
    pub audio_length: Option<u64>,
}

/// 上传响应的 file_id 可能在顶层或 file 对象中，可能是字符串或数字
#[derive(Debug, Deserialize)]
pub(super) struct UploadResponse {
    #[serde(default, deserialize_with = "flexible_id")]
    pub file_id: Option<i64>,
    pub file: Option<FileObject>,
    pub base_resp: Option<BaseResp>,
}

impl UploadResponse {
    pub fn file_id(&self) -> Option<i64> {
        self.file_id
            .or_else(|| self.file.as_ref().and_then(|f| f.file_id))
            .filter(|id| *id > 0)
    }
}

envelope!(
    AsyncSubmitResponse,
    AsyncQueryResponse,
    FileRetrieveResponse,
    SyncResponse,
    UploadResponse,
);

fn flexible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Int(id)) => Some(id),
        Some(RawId::Str(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::{AudioFormat, SynthesisInput, SynthesisParams};

    fn request(input: SynthesisInput) -> SynthesisRequest {
        SynthesisRequest {
            input,
            params: SynthesisParams {
                voice_id: "v1".to_string(),
                model: "speech-01-turbo".to_string(),
                format: AudioFormat::Mp3,
                sample_rate: 32000,
                bitrate: 128000,
                channels: 1,
                speed: 1.0,
                volume: 1.0,
            },
        }
    }

    #[test]
    fn test_request_body_shape() {
        let req = request(SynthesisInput::new(Some("hello".to_string()), None).unwrap());
        let body = serde_json::to_value(T2aRequest::from_request(&req)).unwrap();

        assert_eq!(body["model"], "speech-01-turbo");
        assert_eq!(body["text"], "hello");
        assert!(body.get("text_file_id").is_none());
        assert!(body.get("stream").is_none());
        assert_eq!(body["voice_setting"]["voice_id"], "v1");
        assert_eq!(body["voice_setting"]["vol"], 1.0);
        assert_eq!(body["audio_setting"]["format"], "mp3");
        assert_eq!(body["audio_setting"]["channel"], 1);
    }

    #[test]
    fn test_request_with_text_file() {
        let req = request(SynthesisInput::new(None, Some(321)).unwrap());
        let body = serde_json::to_value(T2aRequest::from_request(&req)).unwrap();
        assert_eq!(body["text_file_id"], 321);
        assert_eq!(body["text"], "");
    }

    #[test]
    fn test_base_resp_check() {
        let ok: AsyncSubmitResponse =
            serde_json::from_str(r#"{"task_id":42,"base_resp":{"status_code":0,"status_msg":"success"}}"#)
                .unwrap();
        assert!(ok.check().is_ok());

        let missing: AsyncSubmitResponse = serde_json::from_str(r#"{"task_id":42}"#).unwrap();
        assert!(missing.check().is_ok());

        let rejected: AsyncSubmitResponse = serde_json::from_str(
            r#"{"task_id":0,"base_resp":{"status_code":1004,"status_msg":"authentication failed"}}"#,
        )
        .unwrap();
        match rejected.check() {
            Err(ProviderError::Rejected { code, message }) => {
                assert_eq!(code, 1004);
                assert_eq!(message, "authentication failed");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_upload_file_id_variants() {
        let top_str: UploadResponse = serde_json::from_str(r#"{"file_id":"123"}"#).unwrap();
        assert_eq!(top_str.file_id(), Some(123));

        let nested_int: UploadResponse =
            serde_json::from_str(r#"{"file":{"file_id":456,"download_url":""}}"#).unwrap();
        assert_eq!(nested_int.file_id(), Some(456));

        let absent: UploadResponse = serde_json::from_str(r#"{"file_id":null}"#).unwrap();
        assert_eq!(absent.file_id(), None);
    }
}
