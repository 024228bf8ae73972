pub mod toml_config;

use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::ServiceConfig;

/// 外部服務的實作選擇
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// 記憶體內實作，用於本機開發
    #[default]
    Memory,
    /// Identity Toolkit + Firestore REST API
    Firebase,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "flowly-backend")]
#[command(about = "Backend API for tracking paid subscriptions")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the listen address (e.g. 0.0.0.0:3000)
    #[arg(long)]
    pub bind: Option<String>,

    /// Override the backend selected in the config file
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔（沒有指定時使用預設值）並套用命令列覆蓋
    pub fn load(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind_addr = bind.clone();
        }
        if let Some(backend) = self.backend {
            config.server.backend = backend;
        }

        let logging = config.logging.get_or_insert_with(Default::default);
        logging.verbose |= self.verbose;
        logging.json |= self.json_logs;

        Ok(config)
    }
}
