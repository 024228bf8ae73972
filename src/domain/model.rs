use serde::{Deserialize, Serialize};

/// 使用者資料文件，以 identity 的 user id 作為 key（id 本身不存在文件內）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "correoElectronico")]
    pub email: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl UserProfile {
    pub fn new(first_name: String, last_name: String, email: String) -> Self {
        Self {
            first_name,
            last_name,
            email,
            subscriptions: Vec::new(),
        }
    }

    /// set-union：只有整筆完全相同才視為重複
    pub fn merge_subscription(&mut self, subscription: Subscription) -> bool {
        if self.subscriptions.contains(&subscription) {
            return false;
        }
        self.subscriptions.push(subscription);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: serde_json::Number,
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "fechaFacturacion")]
    pub billing_date: String,
    #[serde(rename = "tipoPlan")]
    pub plan_type: String,
    #[serde(rename = "imagen")]
    pub image_url: String,
}

/// 從外部送進來、尚未驗證的訂閱資料
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubscription {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "precio", default)]
    pub price: Option<serde_json::Number>,
    #[serde(rename = "moneda", default)]
    pub currency: Option<String>,
    #[serde(rename = "fechaFacturacion", default)]
    pub billing_date: Option<String>,
    #[serde(rename = "tipoPlan", default)]
    pub plan_type: Option<String>,
    #[serde(rename = "imagen", default)]
    pub image_url: Option<String>,
}

/// 所有必填欄位都存在；billing_date 仍是 ISO 格式
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubscription {
    pub name: String,
    pub price: serde_json::Number,
    pub currency: String,
    pub billing_date: String,
    pub plan_type: String,
    pub image_url: String,
}

impl ValidatedSubscription {
    pub fn with_billing_date(self, billing_date: String) -> Subscription {
        Subscription {
            name: self.name,
            price: self.price,
            currency: self.currency,
            billing_date,
            plan_type: self.plan_type,
            image_url: self.image_url,
        }
    }
}

/// 註冊所需的資料
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub secret: String,
}
