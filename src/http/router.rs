use crate::core::engine::AccountEngine;
use crate::http::dto::{
    AddSubscriptionRequest, ErrorResponse, MessageResponse, RegisterRequest, RegisterResponse,
};
use crate::utils::error::{Result, ServiceError};
use hyper::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const REGISTERED_MESSAGE: &str = "Usuario registrado exitosamente";
pub const SUBSCRIPTION_ADDED_MESSAGE: &str = "Suscripción añadida correctamente";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Ruta no encontrada";

/// 依照 method 與 path 分派請求，回傳狀態碼與 JSON 內容
pub async fn route(engine: &AccountEngine, method: &Method, path: &str, body: &[u8]) -> (StatusCode, Value) {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let result = match (method, segments.as_slice()) {
        (&Method::POST, ["users", "register"]) => register(engine, body).await,
        (&Method::GET, ["users", user_id]) if !user_id.is_empty() => get_user(engine, user_id).await,
        (&Method::POST, ["subscriptions", "add"]) => add_subscription(engine, body).await,
        _ => {
            tracing::debug!("No route for {} {}", method, path);
            return error_body(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND_MESSAGE);
        }
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!("❌ {} {} failed: {}", method, path, e);
            } else {
                tracing::warn!("{} {} rejected ({}): {}", method, path, status.as_u16(), e);
            }
            error_body(status, &e.to_string())
        }
    }
}

pub fn error_body(status: StatusCode, message: &str) -> (StatusCode, Value) {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (status, serde_json::to_value(body).unwrap_or(Value::Null))
}

async fn register(engine: &AccountEngine, body: &[u8]) -> Result<(StatusCode, Value)> {
    let request: RegisterRequest = parse_body(body)?;
    let user_id = engine.register(request.into()).await?;

    json_response(
        StatusCode::CREATED,
        &RegisterResponse {
            message: REGISTERED_MESSAGE.to_string(),
            user_id,
        },
    )
}

/// 讀取失敗一律回 404，包含 store 或連線錯誤
async fn get_user(engine: &AccountEngine, raw_id: &str) -> Result<(StatusCode, Value)> {
    let user_id = urlencoding::decode(raw_id).map_err(|_| ServiceError::user_not_found(raw_id))?;

    let profile = engine
        .get_profile(&user_id)
        .await
        .map_err(|e| match e {
            ServiceError::NotFoundError { .. } => e,
            other => {
                tracing::warn!("Reading profile {} failed: {}", user_id, other);
                ServiceError::NotFoundError {
                    message: other.to_string(),
                }
            }
        })?;
    json_response(StatusCode::OK, &profile)
}

async fn add_subscription(engine: &AccountEngine, body: &[u8]) -> Result<(StatusCode, Value)> {
    let request: AddSubscriptionRequest = parse_body(body)?;
    let user_id = request.user_id.unwrap_or_default();
    let raw = request.subscription.unwrap_or_default();

    engine.append_subscription(&user_id, raw).await?;

    json_response(
        StatusCode::OK,
        &MessageResponse {
            message: SUBSCRIPTION_ADDED_MESSAGE.to_string(),
        },
    )
}

/// 空 body 視為 `{}`，型別不符直接回報驗證錯誤
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::validation(format!("Cuerpo JSON inválido: {}", e)))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<(StatusCode, Value)> {
    Ok((status, serde_json::to_value(body)?))
}
