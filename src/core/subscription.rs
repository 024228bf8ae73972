use crate::core::{billing_date, validator};
use crate::domain::model::RawSubscription;
use crate::domain::ports::ProfileStore;
use crate::utils::error::{Result, ServiceError};

/// 驗證、格式化日期後把訂閱合併進使用者的 `subscriptions`
///
/// 在呼叫 store 之前的任何失敗都不會改動資料。
#[tracing::instrument(name = "Append subscription", skip(store, raw))]
pub async fn append_subscription(
    store: &dyn ProfileStore,
    user_id: &str,
    raw: RawSubscription,
) -> Result<()> {
    if user_id.is_empty() {
        return Err(ServiceError::validation("Faltan datos obligatorios: userId"));
    }

    let validated = validator::validate(raw)?;
    let normalized_date = billing_date::normalize(&validated.billing_date)?;
    let subscription = validated.with_billing_date(normalized_date);

    store.append_subscription(user_id, &subscription).await?;

    tracing::info!(
        "✅ Subscription '{}' added for user {}",
        subscription.name,
        user_id
    );
    Ok(())
}
