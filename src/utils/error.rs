use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    IdentityError { message: String },

    #[error("{message}")]
    NotFoundError { message: String },

    #[error("{message}")]
    StoreError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn identity(message: impl Into<String>) -> Self {
        Self::IdentityError {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    /// 使用者不存在時的統一訊息
    pub fn user_not_found(user_id: &str) -> Self {
        Self::NotFoundError {
            message: format!("El usuario con ID {} no fue encontrado.", user_id),
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFoundError { .. } => 404,
            Self::ValidationError { .. }
            | Self::IdentityError { .. }
            | Self::StoreError { .. }
            | Self::ApiError(_)
            | Self::SerializationError(_) => 400,
            Self::IoError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                500
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_kind() {
        assert_eq!(ServiceError::validation("x").status_code(), 400);
        assert_eq!(ServiceError::identity("EMAIL_EXISTS").status_code(), 400);
        assert_eq!(ServiceError::store("boom").status_code(), 400);
        assert_eq!(ServiceError::user_not_found("abc").status_code(), 404);
        assert_eq!(
            ServiceError::ConfigError {
                message: "x".to_string()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn test_identity_message_is_verbatim() {
        let err = ServiceError::identity("EMAIL_EXISTS");
        assert_eq!(err.to_string(), "EMAIL_EXISTS");
    }

    #[test]
    fn test_not_found_message_names_user() {
        let err = ServiceError::user_not_found("abc12345");
        assert_eq!(
            err.to_string(),
            "El usuario con ID abc12345 no fue encontrado."
        );
    }
}
