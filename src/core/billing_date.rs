use crate::utils::error::{Result, ServiceError};
use chrono::{Datelike, NaiveDate};

/// 將 ISO `YYYY-MM-DD` 轉成 `DD-MM-YYYY`
///
/// 只把三段數字當整數解析，再用不含時區的 `NaiveDate` 建立日期，
/// 因此結果與執行環境的時區無關。
pub fn normalize(date_string: &str) -> Result<String> {
    let parts: Vec<&str> = date_string.split('-').collect();
    if parts.len() != 3 {
        return Err(invalid_date(date_string));
    }

    let year: i32 = parse_component(parts[0]).ok_or_else(|| invalid_date(date_string))?;
    let month: u32 = parse_component(parts[1]).ok_or_else(|| invalid_date(date_string))?;
    let day: u32 = parse_component(parts[2]).ok_or_else(|| invalid_date(date_string))?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ServiceError::validation(format!(
            "Fecha de facturación inválida: {} no es una fecha del calendario",
            date_string
        ))
    })?;

    Ok(format!(
        "{:02}-{:02}-{}",
        date.day(),
        date.month(),
        date.year()
    ))
}

fn parse_component<T: std::str::FromStr>(component: &str) -> Option<T> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

fn invalid_date(date_string: &str) -> ServiceError {
    ServiceError::validation(format!(
        "Fecha de facturación inválida: {} (se espera YYYY-MM-DD)",
        date_string
    ))
}
