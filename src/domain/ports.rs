use crate::domain::model::{Subscription, UserProfile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 外部身分驗證服務（帳號密碼的建立與驗證）
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn create_identity(&self, email: &str, secret: &str) -> Result<String>;
    async fn verify_identity(&self, email: &str, secret: &str) -> Result<String>;
    async fn revoke_session(&self) -> Result<()>;
}

/// 以 user id 為 key 的文件儲存
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn put(&self, user_id: &str, profile: &UserProfile) -> Result<()>;
    async fn get(&self, user_id: &str) -> Result<UserProfile>;
    async fn append_subscription(&self, user_id: &str, subscription: &Subscription) -> Result<()>;
}
