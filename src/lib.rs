pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{toml_config::ServiceConfig, Backend};
pub use crate::core::engine::AccountEngine;
pub use crate::http::HttpServer;
pub use crate::utils::error::{Result, ServiceError};
