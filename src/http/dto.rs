use crate::domain::model::{NewUser, RawSubscription};
use serde::{Deserialize, Serialize};

/// POST /users/register
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nombre", default)]
    pub first_name: Option<String>,
    #[serde(rename = "apellido", default)]
    pub last_name: Option<String>,
    #[serde(rename = "correoElectronico", default)]
    pub email: Option<String>,
    #[serde(rename = "contrasenna", default)]
    pub secret: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        Self {
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            secret: request.secret.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// POST /subscriptions/add
#[derive(Debug, Default, Deserialize)]
pub struct AddSubscriptionRequest {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub subscription: Option<RawSubscription>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
