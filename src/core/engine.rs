use crate::core::{registration, subscription};
use crate::domain::model::{NewUser, RawSubscription, UserProfile};
use crate::domain::ports::{IdentityGateway, ProfileStore};
use crate::utils::error::Result;
use std::sync::Arc;

/// 把外部 client 組合起來的入口，由 main 建立後注入給 HTTP 層
#[derive(Clone)]
pub struct AccountEngine {
    identity: Arc<dyn IdentityGateway>,
    store: Arc<dyn ProfileStore>,
}

impl AccountEngine {
    pub fn new(identity: Arc<dyn IdentityGateway>, store: Arc<dyn ProfileStore>) -> Self {
        Self { identity, store }
    }

    pub async fn register(&self, new_user: NewUser) -> Result<String> {
        registration::register(self.identity.as_ref(), self.store.as_ref(), new_user).await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.store.get(user_id).await
    }

    pub async fn append_subscription(&self, user_id: &str, raw: RawSubscription) -> Result<()> {
        subscription::append_subscription(self.store.as_ref(), user_id, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryIdentityGateway, InMemoryProfileStore};
    use crate::utils::error::ServiceError;

    fn engine() -> AccountEngine {
        AccountEngine::new(
            Arc::new(InMemoryIdentityGateway::new()),
            Arc::new(InMemoryProfileStore::new()),
        )
    }

    #[tokio::test]
    async fn test_register_then_append_scenario() {
        let engine = engine();

        let user_id = engine
            .register(NewUser {
                first_name: "Juan".to_string(),
                last_name: "Pérez".to_string(),
                email: "juan.perez@mail.com".to_string(),
                secret: "password123".to_string(),
            })
            .await
            .unwrap();

        let raw: RawSubscription = serde_json::from_value(serde_json::json!({
            "nombre": "Netflix",
            "precio": 15,
            "moneda": "USD",
            "fechaFacturacion": "2024-01-01",
            "tipoPlan": "Premium",
            "imagen": "https://example.com/netflix-logo.png"
        }))
        .unwrap();
        engine.append_subscription(&user_id, raw).await.unwrap();

        let profile = engine.get_profile(&user_id).await.unwrap();
        assert_eq!(profile.subscriptions.len(), 1);
        assert_eq!(profile.subscriptions[0].billing_date, "01-01-2024");
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let err = engine().get_profile("never-registered").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFoundError { .. }));
    }
}
