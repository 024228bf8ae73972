use crate::domain::model::{NewUser, UserProfile};
use crate::domain::ports::{IdentityGateway, ProfileStore};
use crate::utils::error::Result;
use crate::utils::validation::RequiredFields;

/// 建立 identity 後再寫入 profile 文件
///
/// profile 寫入失敗時不會回滾已建立的 identity，會留下沒有 profile 的帳號。
#[tracing::instrument(name = "Register user", skip(identity, store, new_user), fields(email = %new_user.email))]
pub async fn register(
    identity: &dyn IdentityGateway,
    store: &dyn ProfileStore,
    new_user: NewUser,
) -> Result<String> {
    let mut fields = RequiredFields::new();
    fields.text("nombre", Some(new_user.first_name.as_str()));
    fields.text("apellido", Some(new_user.last_name.as_str()));
    fields.text("correoElectronico", Some(new_user.email.as_str()));
    fields.text("contrasenna", Some(new_user.secret.as_str()));
    fields.finish()?;

    let user_id = identity
        .create_identity(&new_user.email, &new_user.secret)
        .await?;
    tracing::debug!("Identity created: {}", user_id);

    let profile = UserProfile::new(new_user.first_name, new_user.last_name, new_user.email);

    if let Err(e) = store.put(&user_id, &profile).await {
        tracing::warn!(
            "⚠️ Profile write failed after identity creation, identity {} left without profile: {}",
            user_id,
            e
        );
        return Err(e);
    }

    tracing::info!("✅ User registered: {}", user_id);
    Ok(user_id)
}
