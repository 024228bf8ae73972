use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 未設定 `RUST_LOG` 時使用設定檔的 level
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("flowly_backend={}", level)))
        .unwrap_or_else(|_| EnvFilter::new("flowly_backend=info"))
}

pub fn init_cli_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 部署環境使用 JSON 格式，方便日誌平台收集
pub fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
