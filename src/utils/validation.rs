use crate::utils::error::{Result, ServiceError};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ServiceError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse::<SocketAddr>()
        .map_err(|e| ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

/// 收集缺少的必填欄位，一次回報全部而不是遇到第一個就停止
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 字串欄位：缺少或空字串都視為缺少（不做 trim）
    pub fn text<'a>(&mut self, field_name: &'static str, value: Option<&'a str>) -> Option<&'a str> {
        match value {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.missing.push(field_name);
                None
            }
        }
    }

    /// 數字欄位：缺少或等於 0 都視為缺少
    pub fn number(
        &mut self,
        field_name: &'static str,
        value: Option<&serde_json::Number>,
    ) -> Option<serde_json::Number> {
        match value {
            Some(n) if !is_zero(n) => Some(n.clone()),
            _ => {
                self.missing.push(field_name);
                None
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            return Ok(());
        }
        Err(self.into_error())
    }

    pub fn into_error(self) -> ServiceError {
        ServiceError::validation(format!(
            "Faltan datos obligatorios: {}",
            self.missing.join(", ")
        ))
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64().map(|v| v == 0.0).unwrap_or(false)
}
