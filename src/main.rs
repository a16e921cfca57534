//! Sonora - 异步语音合成任务编排服务
//!
//! - Domain: synthesis/ (Bounded Context)
//! - Application: commands, queries, ports
//! - Infrastructure: http, adapters, memory, persistence

use std::sync::Arc;

use sonora::application::ProviderClientFactory;
use sonora::config::{load_config, print_config, AppConfig};
use sonora::infrastructure::adapters::{
    FakeProviderClient, FakeProviderFactory, FileArtifactStorage, HttpProviderClientConfig,
    HttpProviderFactory,
};
use sonora::infrastructure::http::{AppState, HttpServer, ServerConfig};
use sonora::infrastructure::memory::InMemoryJobLockRegistry;
use sonora::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCredentialRepository,
    SqliteSynthesisJobRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Sonora - 异步语音合成任务编排服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let job_repo = Arc::new(SqliteSynthesisJobRepository::new(pool.clone()));
    let credential_repo = Arc::new(SqliteCredentialRepository::new(pool));

    // 服务商客户端
    let provider_factory: Arc<dyn ProviderClientFactory> = if config.provider.use_fake {
        // 本地联调：不访问网络，远程任务立即完成
        tracing::warn!("Using fake synthesis provider");
        Arc::new(FakeProviderFactory::new(Arc::new(FakeProviderClient::new())))
    } else {
        let provider_config = HttpProviderClientConfig::new(&config.provider.base_url)
            .with_timeout(config.provider.timeout_secs);
        Arc::new(HttpProviderFactory::new(provider_config)?)
    };

    // 生成音频存储
    let storage = Arc::new(
        FileArtifactStorage::new(&config.storage.output_dir, &config.storage.public_prefix)
            .await?,
    );

    let locks = Arc::new(InMemoryJobLockRegistry::new());

    // 创建 HTTP 服务器
    let mut server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.storage.max_upload_size as usize);
    if config.server.serve_files {
        server_config = server_config.with_files(
            storage.base_dir().to_path_buf(),
            storage.public_prefix().to_string(),
        );
    }

    let state = AppState::new(
        job_repo,
        credential_repo,
        provider_factory,
        storage,
        locks,
        config.provider.synthesis_defaults(),
    );

    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志（RUST_LOG 优先于配置）
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},sonora={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
