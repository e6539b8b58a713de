use std::sync::Arc;

use quiz_core::SystemClock;
use quiz_server::{ServerConfig, start_server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_server=debug,quiz_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 读取配置
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    info!(
        "Starting quiz server on {} (activity log: {})",
        config.addr,
        config.activity_log.display()
    );

    // 启动服务器
    let handle = start_server(&config, Arc::new(SystemClock))
        .await
        .expect("Failed to start server");

    // 等待 Ctrl-C 后优雅退出
    let shutdown = handle.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown requested");
        shutdown.cancel();
    });

    handle.wait().await;
}
