//! Dora - 引导冥想音频生成服务
//!
//! 启动顺序：配置 → 日志 → SQLite → 对象存储 → 后端注册表 → 音频 → HTTP 服务

use std::sync::Arc;
use std::time::Duration;

use dora::application::GenerationConfig;
use dora::config::{load_config, print_config, AppConfig};
use dora::infrastructure::adapters::audio::{PcmAudioAssembler, PcmSilenceSynthesizer};
use dora::infrastructure::adapters::identity::HmacTokenIdentity;
use dora::infrastructure::adapters::storage::{FileObjectStorage, UrlSigner};
use dora::infrastructure::adapters::{text, tts};
use dora::infrastructure::http::{AppPorts, AppSettings, AppState, HttpServer};
use dora::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteCreditRepository,
    SqliteMeditationRepository,
};
use dora::infrastructure::worker::{CreditResetWorker, CreditResetWorkerConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},dora={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Dora - guided meditation generation service");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
    run_migrations(&pool).await?;

    let meditation_repo = Arc::new(SqliteMeditationRepository::new(pool.clone()));
    let credit_repo = Arc::new(SqliteCreditRepository::new(pool));

    // 对象存储（签名链接指向本服务的 /media 路由）
    let public_base_url = config
        .storage
        .public_base_url
        .clone()
        .unwrap_or_else(|| config.server.public_base_url());
    let object_storage = Arc::new(
        FileObjectStorage::new(
            &config.storage.root_dir,
            UrlSigner::new(&config.storage.signing_secret),
            public_base_url,
        )
        .await?,
    );

    // 文本生成 / 语音合成后端（只注册配置了凭据的）
    let script_generators = Arc::new(text::build_registry(&config.text)?);
    let voice_synthesizers = Arc::new(tts::build_registry(&config.voice)?);

    // 音频拼接与静音，静音使用拼接器调整后的输出参数
    let assembler = PcmAudioAssembler::new(config.audio.output_spec());
    let silence = PcmSilenceSynthesizer::for_output(&assembler.output_spec());

    let ports = AppPorts {
        identity: Arc::new(HmacTokenIdentity::new(&config.auth.token_secret)),
        credit_repo,
        meditation_repo,
        object_storage,
        script_generators,
        voice_synthesizers,
        silence_synthesizer: Arc::new(silence),
        audio_assembler: Arc::new(assembler),
    };
    let settings = AppSettings {
        generation: GenerationConfig {
            max_concurrent_synthesis: config.voice.max_concurrent,
        },
        credit_policy: config.credits.policy(),
        signed_url_ttl_secs: config.storage.signed_url_ttl_secs,
        signing_secret: config.storage.signing_secret.clone(),
        admin_secret: config.auth.admin_secret.clone(),
    };
    let state = Arc::new(AppState::new(ports, settings));

    // 启动额度重置 Worker
    if config.credits.enabled {
        let worker = CreditResetWorker::new(
            CreditResetWorkerConfig {
                sweep_interval: Duration::from_secs(config.credits.sweep_interval_secs),
            },
            state.reset_credits_handler.clone(),
        );
        tokio::spawn(worker.run());
    }

    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
