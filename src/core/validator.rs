use crate::domain::model::{RawSubscription, ValidatedSubscription};
use crate::utils::error::Result;
use crate::utils::validation::RequiredFields;
use serde_json::Number;

/// 2^53，超過這個範圍的浮點數無法精確轉成整數
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 檢查訂閱的必填欄位，缺少的欄位一次全部回報
///
/// `precio` 為 0 時同樣視為缺少。整數值的價格統一成整數表示，其餘原樣通過，日期格式化留給 `billing_date`。
pub fn validate(raw: RawSubscription) -> Result<ValidatedSubscription> {
    let mut fields = RequiredFields::new();

    let name = fields.text("nombre", raw.name.as_deref()).map(str::to_string);
    let price = fields.number("precio", raw.price.as_ref());
    let currency = fields.text("moneda", raw.currency.as_deref()).map(str::to_string);
    let billing_date = fields
        .text("fechaFacturacion", raw.billing_date.as_deref())
        .map(str::to_string);
    let plan_type = fields.text("tipoPlan", raw.plan_type.as_deref()).map(str::to_string);
    let image_url = fields.text("imagen", raw.image_url.as_deref()).map(str::to_string);

    let (
        Some(name),
        Some(price),
        Some(currency),
        Some(billing_date),
        Some(plan_type),
        Some(image_url),
    ) = (name, price, currency, billing_date, plan_type, image_url)
    else {
        return Err(fields.into_error());
    };

    Ok(ValidatedSubscription {
        name,
        price: canonical_price(price),
        currency,
        billing_date,
        plan_type,
        image_url,
    })
}

/// 整數值的浮點數（15.0）改成整數表示，重複判斷才會以數值為準
fn canonical_price(price: Number) -> Number {
    match price.as_f64() {
        Some(value) if price.is_f64() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER => {
            Number::from(value as i64)
        }
        _ => price,
    }
}
