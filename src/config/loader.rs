//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SONORA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SONORA_SERVER__PORT=8080`
/// - `SONORA_PROVIDER__BASE_URL=https://api.minimaxi.com/v1`
/// - `SONORA_PROVIDER__USE_FAKE=true`
/// - `SONORA_STORAGE__OUTPUT_DIR=/data/generated`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("server.serve_files", true)?
        .set_default("provider.base_url", "https://api.minimaxi.com/v1")?
        .set_default("provider.timeout_secs", 60)?
        .set_default("provider.model", "speech-01-turbo")?
        .set_default("provider.sample_rate", 32000)?
        .set_default("provider.bitrate", 128000)?
        .set_default("provider.format", "mp3")?
        .set_default("provider.channels", 1)?
        .set_default("provider.use_fake", false)?
        .set_default("database.path", "data/sonora.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.output_dir", "data/generated")?
        .set_default("storage.public_prefix", "/files")?
        .set_default("storage.max_upload_size", 10 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: SONORA_PROVIDER__TIMEOUT_SECS=120
    builder = builder.add_source(
        Environment::with_prefix("SONORA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if !config.provider.use_fake && config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Provider base URL cannot be empty".to_string(),
        ));
    }

    if config.provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Provider timeout cannot be 0".to_string(),
        ));
    }

    if !matches!(config.provider.channels, 1 | 2) {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported channel count: {}",
            config.provider.channels
        )));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    // 前缀会挂载为静态路由，不能为空或根路径
    let prefix = config.storage.public_prefix.trim_end_matches('/');
    if !prefix.starts_with('/') || prefix.len() < 2 {
        return Err(ConfigError::ValidationError(format!(
            "Storage public prefix must look like \"/files\", got \"{}\"",
            config.storage.public_prefix
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.provider.use_fake {
        tracing::info!("Provider: fake (no network)");
    } else {
        tracing::info!("Provider URL: {}", config.provider.base_url);
    }
    tracing::info!("Provider Timeout: {}s", config.provider.timeout_secs);
    tracing::info!(
        "Synthesis Defaults: model={} format={} sample_rate={} bitrate={} channels={}",
        config.provider.model,
        config.provider.format.as_str(),
        config.provider.sample_rate,
        config.provider.bitrate,
        config.provider.channels
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!(
        "Output Directory: {:?} (served at {})",
        config.storage.output_dir,
        config.storage.public_prefix
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_provider_url() {
        let mut config = AppConfig::default();
        config.provider.base_url = String::new();
        assert!(validate_config(&config).is_err());

        // Fake 服务商不需要 URL
        config.provider.use_fake = true;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_prefix() {
        let mut config = AppConfig::default();
        config.storage.public_prefix = "/".to_string();
        assert!(validate_config(&config).is_err());

        config.storage.public_prefix = "files".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_channels() {
        let mut config = AppConfig::default();
        config.provider.channels = 3;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[provider]\nmodel = \"speech-02-hd\"\nformat = \"wav\"\n\n[storage]\npublic_prefix = \"/audio\""
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.provider.model, "speech-02-hd");
        assert_eq!(config.provider.format.as_str(), "wav");
        assert_eq!(config.storage.public_prefix, "/audio");
        // 未覆盖的保持默认
        assert_eq!(config.provider.sample_rate, 32000);
        assert_eq!(config.database.path, "data/sonora.db");
    }
}
