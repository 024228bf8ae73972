use crate::config::Backend;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{
    validate_non_empty_string, validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_COLLECTION: &str = "users";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub identity: Option<IdentityConfig>,
    pub store: Option<StoreConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub backend: Backend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_endpoint")]
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_endpoint")]
    pub endpoint: String,
    pub project_id: String,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub verbose: bool,
    /// `trace` / `debug` / `info` / `warn` / `error`
    pub level: Option<String>,
}

fn default_bind_addr() -> String {
    // 與一般 PaaS 相同，優先使用 PORT 環境變數
    match std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        Some(port) => format!("0.0.0.0:{}", port),
        None => format!("127.0.0.1:{}", DEFAULT_PORT),
    }
}

fn default_identity_endpoint() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_store_endpoint() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            backend: Backend::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            identity: None,
            store: None,
            logging: None,
        }
    }
}

impl StoreConfig {
    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FIREBASE_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind_addr", &self.server.bind_addr)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().map(|l| l.verbose).unwrap_or(false)
    }

    /// verbose 優先於 `[logging] level`
    pub fn log_level(&self) -> &str {
        if self.verbose() {
            return "debug";
        }
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn identity_config(&self) -> Result<&IdentityConfig> {
        self.identity.as_ref().ok_or_else(|| ServiceError::ConfigError {
            message: "[identity] section is required for the firebase backend".to_string(),
        })
    }

    pub fn store_config(&self) -> Result<&StoreConfig> {
        self.store.as_ref().ok_or_else(|| ServiceError::ConfigError {
            message: "[store] section is required for the firebase backend".to_string(),
        })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.bind_addr()?;

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            if !LOG_LEVELS.contains(&level) {
                return Err(ServiceError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        if self.server.backend == Backend::Firebase {
            let identity = self.identity_config()?;
            validate_url("identity.endpoint", &identity.endpoint)?;
            validate_non_empty_string("identity.api_key", &identity.api_key)?;

            let store = self.store_config()?;
            validate_url("store.endpoint", &store.endpoint)?;
            validate_non_empty_string("store.project_id", &store.project_id)?;
            validate_non_empty_string("store.collection", store.collection())?;
        }

        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
