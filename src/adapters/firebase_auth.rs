use crate::config::toml_config::IdentityConfig;
use crate::domain::ports::IdentityGateway;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity Toolkit REST API (`accounts:signUp` / `accounts:signInWithPassword`)
pub struct FirebaseIdentityGateway {
    client: Client,
    config: IdentityConfig,
    session: Mutex<Option<String>>,
}

impl FirebaseIdentityGateway {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            session: Mutex::new(None),
        }
    }

    async fn call(&self, action: &str, email: &str, secret: &str) -> Result<AuthResponse> {
        let url = format!(
            "{}/v1/accounts:{}",
            self.config.endpoint.trim_end_matches('/'),
            action
        );
        tracing::debug!("Calling identity provider: accounts:{}", action);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": secret,
                "returnSecureToken": true
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // 供應商的錯誤訊息原樣回傳
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Identity provider returned status {}", status));
        Err(ServiceError::identity(message))
    }

    async fn start_session(&self, auth: &AuthResponse) {
        *self.session.lock().await = auth.id_token.clone();
    }
}

#[async_trait]
impl IdentityGateway for FirebaseIdentityGateway {
    async fn create_identity(&self, email: &str, secret: &str) -> Result<String> {
        let auth = self.call("signUp", email, secret).await?;
        self.start_session(&auth).await;
        Ok(auth.local_id)
    }

    async fn verify_identity(&self, email: &str, secret: &str) -> Result<String> {
        let auth = self.call("signInWithPassword", email, secret).await?;
        self.start_session(&auth).await;
        Ok(auth.local_id)
    }

    async fn revoke_session(&self) -> Result<()> {
        match self.session.lock().await.take() {
            Some(_) => Ok(()),
            None => Err(ServiceError::identity("NO_ACTIVE_SESSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn gateway_for(server: &MockServer) -> FirebaseIdentityGateway {
        FirebaseIdentityGateway::new(IdentityConfig {
            endpoint: server.base_url(),
            api_key: "test-key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_sign_up_returns_local_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/accounts:signUp")
                .query_param("key", "test-key")
                .json_body(json!({
                    "email": "juan.perez@mail.com",
                    "password": "password123",
                    "returnSecureToken": true
                }));
            then.status(200).json_body(json!({
                "kind": "identitytoolkit#SignupNewUserResponse",
                "idToken": "token-1",
                "email": "juan.perez@mail.com",
                "refreshToken": "refresh-1",
                "expiresIn": "3600",
                "localId": "abc12345"
            }));
        });

        let gateway = gateway_for(&server);
        let user_id = gateway
            .create_identity("juan.perez@mail.com", "password123")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(user_id, "abc12345");
        assert!(gateway.revoke_session().await.is_ok());
    }

    #[tokio::test]
    async fn test_provider_error_message_is_passed_through() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/accounts:signUp");
            then.status(400).json_body(json!({
                "error": {
                    "code": 400,
                    "message": "EMAIL_EXISTS",
                    "errors": [{"message": "EMAIL_EXISTS", "domain": "global", "reason": "invalid"}]
                }
            }));
        });

        let err = gateway_for(&server)
            .create_identity("juan.perez@mail.com", "password123")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::IdentityError { .. }));
        assert_eq!(err.to_string(), "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn test_sign_in_and_revoke() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/accounts:signInWithPassword");
            then.status(200)
                .json_body(json!({"localId": "abc12345", "idToken": "token-2", "registered": true}));
        });

        let gateway = gateway_for(&server);
        assert!(gateway.revoke_session().await.is_err());

        let user_id = gateway
            .verify_identity("juan.perez@mail.com", "password123")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(user_id, "abc12345");
        assert!(gateway.revoke_session().await.is_ok());
        assert!(gateway.revoke_session().await.is_err());
    }

    #[tokio::test]
    async fn test_unparseable_error_body_reports_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/accounts:signInWithPassword");
            then.status(503).body("upstream unavailable");
        });

        let err = gateway_for(&server)
            .verify_identity("a@b.com", "secret1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
