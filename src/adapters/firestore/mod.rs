pub mod codec;

use crate::config::toml_config::StoreConfig;
use crate::domain::model::{Subscription, UserProfile};
use crate::domain::ports::ProfileStore;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const SUBSCRIPTIONS_FIELD: &str = "subscriptions";

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Firestore REST API 上的 profile 儲存
pub struct FirestoreProfileStore {
    client: Client,
    config: StoreConfig,
}

impl FirestoreProfileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id,
            self.config.database()
        )
    }

    /// 無法當成文件 id 的值不可能有對應的 profile，直接視為 NotFound
    fn document_name(&self, user_id: &str) -> Result<String> {
        if !is_valid_document_id(user_id) {
            return Err(ServiceError::user_not_found(user_id));
        }
        Ok(format!(
            "{}/{}/{}",
            self.documents_root(),
            self.config.collection(),
            user_id
        ))
    }

    /// URL 用的文件路徑，id 需要 percent-encode
    fn document_path(&self, user_id: &str) -> Result<String> {
        self.document_name(user_id)?;
        Ok(format!(
            "{}/{}/{}",
            self.documents_root(),
            self.config.collection(),
            urlencoding::encode(user_id)
        ))
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        let url = format!(
            "{}/v1/{}",
            self.config.endpoint.trim_end_matches('/'),
            resource
        );
        let mut builder = self.client.request(method, url);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.query(&[("key", key)]);
        }
        if let Some(token) = self.config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

fn is_valid_document_id(id: &str) -> bool {
    let reserved = id.len() >= 4 && id.starts_with("__") && id.ends_with("__");
    !id.is_empty() && id != "." && id != ".." && !id.contains('/') && !reserved
}

/// 把 Firestore 的錯誤回應轉成 ServiceError；不存在的文件一律視為 NotFound
async fn into_error(response: Response, user_id: &str) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorEnvelope>(&body).ok();

    let not_found = status == StatusCode::NOT_FOUND
        || parsed
            .as_ref()
            .map(|e| e.error.status == "NOT_FOUND")
            .unwrap_or(false);
    if not_found {
        return ServiceError::user_not_found(user_id);
    }

    let message = parsed
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Firestore request failed with status {}", status));
    ServiceError::store(message)
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn put(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let path = self.document_path(user_id)?;
        let body = json!({ "fields": codec::to_fields(profile)? });

        tracing::debug!("PATCH document {}", path);
        let response = self.request(Method::PATCH, &path).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(into_error(response, user_id).await);
        }
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<UserProfile> {
        let path = self.document_path(user_id)?;

        tracing::debug!("GET document {}", path);
        let response = self.request(Method::GET, &path).send().await?;
        if !response.status().is_success() {
            return Err(into_error(response, user_id).await);
        }

        let document: Document = response.json().await?;
        codec::from_fields(&document.fields)
    }

    async fn append_subscription(&self, user_id: &str, subscription: &Subscription) -> Result<()> {
        let name = self.document_name(user_id)?;
        let element = codec::encode_value(&serde_json::to_value(subscription)?);

        // appendMissingElements 即 set-union；exists 前置條件避免隱式建立文件
        let body = json!({
            "writes": [{
                "transform": {
                    "document": name,
                    "fieldTransforms": [{
                        "fieldPath": SUBSCRIPTIONS_FIELD,
                        "appendMissingElements": { "values": [element] }
                    }]
                },
                "currentDocument": { "exists": true }
            }]
        });

        let commit = format!("{}:commit", self.documents_root());
        tracing::debug!("POST {} (append to {})", commit, user_id);
        let response = self.request(Method::POST, &commit).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(into_error(response, user_id).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    const DOC_PATH: &str = "/v1/projects/flowly-test/databases/(default)/documents/users/abc123";
    const COMMIT_PATH: &str = "/v1/projects/flowly-test/databases/(default)/documents:commit";

    fn store_for(server: &MockServer) -> FirestoreProfileStore {
        FirestoreProfileStore::new(StoreConfig {
            endpoint: server.base_url(),
            project_id: "flowly-test".to_string(),
            database: None,
            collection: None,
            api_key: Some("test-key".to_string()),
            auth_token: None,
        })
    }

    fn netflix() -> Subscription {
        Subscription {
            name: "Netflix".to_string(),
            price: 15.into(),
            currency: "USD".to_string(),
            billing_date: "01-01-2024".to_string(),
            plan_type: "Premium".to_string(),
            image_url: "https://example.com/netflix-logo.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_patches_whole_document() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path(DOC_PATH)
                .query_param("key", "test-key")
                .json_body(json!({
                    "fields": {
                        "nombre": {"stringValue": "Juan"},
                        "apellido": {"stringValue": "Pérez"},
                        "correoElectronico": {"stringValue": "juan.perez@mail.com"},
                        "subscriptions": {"arrayValue": {}}
                    }
                }));
            then.status(200).json_body(json!({"name": "ignored"}));
        });

        let profile = UserProfile::new("Juan".into(), "Pérez".into(), "juan.perez@mail.com".into());
        store_for(&server).put("abc123", &profile).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_get_decodes_document() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path(DOC_PATH);
            then.status(200).json_body(json!({
                "name": "projects/flowly-test/databases/(default)/documents/users/abc123",
                "fields": {
                    "nombre": {"stringValue": "Juan"},
                    "apellido": {"stringValue": "Pérez"},
                    "correoElectronico": {"stringValue": "juan.perez@mail.com"},
                    "subscriptions": {"arrayValue": {"values": [{"mapValue": {"fields": {
                        "nombre": {"stringValue": "Netflix"},
                        "precio": {"integerValue": "15"},
                        "moneda": {"stringValue": "USD"},
                        "fechaFacturacion": {"stringValue": "01-01-2024"},
                        "tipoPlan": {"stringValue": "Premium"},
                        "imagen": {"stringValue": "https://example.com/netflix-logo.png"}
                    }}}]}}
                },
                "createTime": "2024-01-01T00:00:00Z",
                "updateTime": "2024-01-01T00:00:00Z"
            }));
        });

        let profile = store_for(&server).get("abc123").await.unwrap();

        mock.assert();
        assert_eq!(profile.first_name, "Juan");
        assert_eq!(profile.subscriptions, vec![netflix()]);
    }

    #[tokio::test]
    async fn test_get_missing_document_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(DOC_PATH);
            then.status(404).json_body(json!({
                "error": {"code": 404, "message": "Document not found", "status": "NOT_FOUND"}
            }));
        });

        let err = store_for(&server).get("abc123").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFoundError { .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_append_commits_array_union_with_exists_precondition() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(COMMIT_PATH)
                .body_contains("appendMissingElements")
                .body_contains("\"exists\":true")
                .body_contains("\"fieldPath\":\"subscriptions\"");
            then.status(200)
                .json_body(json!({"writeResults": [{}], "commitTime": "2024-01-01T00:00:00Z"}));
        });

        store_for(&server)
            .append_subscription("abc123", &netflix())
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_append_to_missing_document_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(COMMIT_PATH);
            then.status(404).json_body(json!({
                "error": {"code": 404, "message": "No document to update", "status": "NOT_FOUND"}
            }));
        });

        let err = store_for(&server)
            .append_subscription("abc123", &netflix())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFoundError { .. }));
    }

    #[tokio::test]
    async fn test_other_failures_surface_store_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path(DOC_PATH);
            then.status(403).json_body(json!({
                "error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}
            }));
        });

        let profile = UserProfile::new("a".into(), "b".into(), "c@d.com".into());
        let err = store_for(&server).put("abc123", &profile).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreError { .. }));
        assert_eq!(err.to_string(), "Missing or insufficient permissions.");
    }

    #[tokio::test]
    async fn test_invalid_document_ids_are_not_found_without_request() {
        let server = MockServer::start();
        let any_get = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({"fields": {}}));
        });
        let store = store_for(&server);

        for id in ["a/b", ".", "..", "__users__"] {
            let err = store.get(id).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotFoundError { .. }), "{}", id);
        }
        let err = store.append_subscription("..", &netflix()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFoundError { .. }));

        assert_eq!(any_get.hits(), 0);
    }

    #[test]
    fn test_document_path_encodes_id() {
        let server = MockServer::start();
        let store = store_for(&server);
        assert_eq!(
            store.document_path("a b?c").unwrap(),
            "projects/flowly-test/databases/(default)/documents/users/a%20b%3Fc"
        );
        assert_eq!(
            store.document_name("a b?c").unwrap(),
            "projects/flowly-test/databases/(default)/documents/users/a b?c"
        );
    }
}
