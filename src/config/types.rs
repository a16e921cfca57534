//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::SynthesisDefaults;
use crate::domain::synthesis::AudioFormat;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 语音合成服务商配置
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 是否对外提供生成音频的静态访问
    #[serde(default = "default_serve_files")]
    pub serve_files: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

fn default_serve_files() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            serve_files: default_serve_files(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 服务商配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// 服务商 API 基础 URL
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// 默认模型
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_bitrate")]
    pub bitrate: u32,

    /// 可选: mp3, wav, flac, pcm
    #[serde(default)]
    pub format: AudioFormat,

    /// 声道数，1 单声道 / 2 立体声
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// 使用本地 Fake 服务商（联调用，不访问网络）
    #[serde(default)]
    pub use_fake: bool,
}

fn default_provider_url() -> String {
    "https://api.minimaxi.com/v1".to_string()
}

fn default_provider_timeout() -> u64 {
    60
}

fn default_model() -> String {
    "speech-01-turbo".to_string()
}

fn default_sample_rate() -> u32 {
    32000
}

fn default_bitrate() -> u32 {
    128000
}

fn default_channels() -> u8 {
    1
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            timeout_secs: default_provider_timeout(),
            model: default_model(),
            sample_rate: default_sample_rate(),
            bitrate: default_bitrate(),
            format: AudioFormat::default(),
            channels: default_channels(),
            use_fake: false,
        }
    }
}

impl ProviderConfig {
    /// 请求未指定参数时的合成默认值
    pub fn synthesis_defaults(&self) -> SynthesisDefaults {
        SynthesisDefaults {
            model: self.model.clone(),
            format: self.format,
            sample_rate: self.sample_rate,
            bitrate: self.bitrate,
            channels: self.channels,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/sonora.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 生成音频存储目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 产物引用的 URL 前缀，同时也是静态访问路径
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// 上传文件最大大小（字节），默认 10MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/generated")
}

fn default_public_prefix() -> String {
    "/files".to_string()
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_prefix: default_public_prefix(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
