use crate::domain::model::{Subscription, UserProfile};
use crate::domain::ports::{IdentityGateway, ProfileStore};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, RwLock};

const MIN_SECRET_LENGTH: usize = 6;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    secret: String,
}

/// 本機開發與測試用的 identity 服務，錯誤訊息與 Identity Toolkit 相同
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityGateway {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    session: Arc<Mutex<Option<String>>>,
}

impl InMemoryIdentityGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn identity_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl IdentityGateway for InMemoryIdentityGateway {
    async fn create_identity(&self, email: &str, secret: &str) -> Result<String> {
        if !email_pattern().is_match(email) {
            return Err(ServiceError::identity("INVALID_EMAIL"));
        }
        if secret.chars().count() < MIN_SECRET_LENGTH {
            return Err(ServiceError::identity(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.write().await;
        let key = email.to_lowercase();
        if accounts.contains_key(&key) {
            return Err(ServiceError::identity("EMAIL_EXISTS"));
        }

        let user_id = uuid::Uuid::new_v4().simple().to_string();
        accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                secret: secret.to_string(),
            },
        );
        *self.session.lock().await = Some(user_id.clone());

        Ok(user_id)
    }

    async fn verify_identity(&self, email: &str, secret: &str) -> Result<String> {
        let accounts = self.accounts.read().await;
        match accounts.get(&email.to_lowercase()) {
            Some(account) if account.secret == secret => {
                *self.session.lock().await = Some(account.user_id.clone());
                Ok(account.user_id.clone())
            }
            _ => Err(ServiceError::identity("INVALID_LOGIN_CREDENTIALS")),
        }
    }

    async fn revoke_session(&self) -> Result<()> {
        match self.session.lock().await.take() {
            Some(_) => Ok(()),
            None => Err(ServiceError::identity("NO_ACTIVE_SESSION")),
        }
    }
}

/// 記憶體內的 profile 文件儲存，每次 append 在同一把寫鎖內完成
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    documents: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn profile_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn put(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        self.documents
            .write()
            .await
            .insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<UserProfile> {
        self.documents
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::user_not_found(user_id))
    }

    async fn append_subscription(&self, user_id: &str, subscription: &Subscription) -> Result<()> {
        let mut documents = self.documents.write().await;
        let profile = documents
            .get_mut(user_id)
            .ok_or_else(|| ServiceError::user_not_found(user_id))?;

        if !profile.merge_subscription(subscription.clone()) {
            tracing::debug!("Subscription already present for {}, skipped", user_id);
        }
        Ok(())
    }
}
