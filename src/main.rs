//! Rovel Unlock - 小说众筹解锁服务
//!
//! - Domain: catalog/, funding/, unlock/
//! - Application: engine, commands, queries, ports
//! - Infrastructure: http, memory, persistence, events

use std::sync::Arc;
use std::time::Duration;

use rovel_unlock::application::{CatalogCachePort, RetryPolicy};
use rovel_unlock::config::{load_config, print_config, AppConfig};
use rovel_unlock::infrastructure::events::EventPublisher;
use rovel_unlock::infrastructure::http::{AppState, HttpServer, ServerConfig};
use rovel_unlock::infrastructure::memory::InMemoryCatalogCache;
use rovel_unlock::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteNovelRepository, SqliteUnitOfWorkFactory,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},rovel_unlock={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("Rovel Unlock - crowdfunded sequential unlock service");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
        busy_timeout: config.database.busy_timeout(),
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let uow_factory = Arc::new(SqliteUnitOfWorkFactory::new(pool));
    let catalog_cache: Arc<dyn CatalogCachePort> =
        Arc::new(InMemoryCatalogCache::new(config.cache.enabled));
    let event_publisher = EventPublisher::new(config.events.channel_capacity).arc();

    let retry_policy = RetryPolicy {
        max_retries: config.unlock.max_retries,
        backoff: Duration::from_millis(config.unlock.retry_backoff_ms),
    };

    let state = AppState::new(
        novel_repo,
        uow_factory,
        catalog_cache,
        event_publisher,
        retry_policy,
        Duration::from_secs(config.events.keep_alive_secs),
    );

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
