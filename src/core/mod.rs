pub mod billing_date;
pub mod engine;
pub mod registration;
pub mod subscription;
pub mod validator;

