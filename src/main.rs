use clap::Parser;
use flowly_backend::adapters::{
    FirebaseIdentityGateway, FirestoreProfileStore, InMemoryIdentityGateway, InMemoryProfileStore,
};
use flowly_backend::domain::ports::{IdentityGateway, ProfileStore};
use flowly_backend::utils::{logger, validation::Validate};
use flowly_backend::{AccountEngine, Backend, CliConfig, HttpServer, ServiceConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入設定並套用命令列覆蓋
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(config.log_level());
    }

    tracing::info!("Starting flowly-backend");
    tracing::debug!("Service config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let engine = build_engine(&config)?;
    let server = HttpServer::bind(config.bind_addr()?, engine).await?;

    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("✅ Server stopped");
    Ok(())
}

/// 依 backend 建立外部 client，生命週期由 main 持有
fn build_engine(config: &ServiceConfig) -> anyhow::Result<AccountEngine> {
    let identity: Arc<dyn IdentityGateway>;
    let store: Arc<dyn ProfileStore>;

    match config.server.backend {
        Backend::Memory => {
            tracing::warn!("🔧 Using in-memory backend, data is lost on restart");
            identity = Arc::new(InMemoryIdentityGateway::new());
            store = Arc::new(InMemoryProfileStore::new());
        }
        Backend::Firebase => {
            let store_config = config.store_config()?.clone();
            tracing::info!(
                "🔥 Using Firebase backend (project: {})",
                store_config.project_id
            );
            identity = Arc::new(FirebaseIdentityGateway::new(
                config.identity_config()?.clone(),
            ));
            store = Arc::new(FirestoreProfileStore::new(store_config));
        }
    }

    Ok(AccountEngine::new(identity, store))
}
