//! JSON <-> Firestore typed `Value` conversion.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`, `{"integerValue": "15"}`, ...). Integers are
//! transported as strings; doubles as JSON numbers.

use crate::utils::error::{Result, ServiceError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        json!({ "integerValue": i.to_string() })
    } else if let Some(u) = n.as_u64() {
        json!({ "integerValue": u.to_string() })
    } else {
        json!({ "doubleValue": n.as_f64().unwrap_or_default() })
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(fields)
}

pub fn decode_value(value: &Value) -> Result<Value> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed("typed value must be an object", value))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| malformed("typed value is empty", value))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| malformed("booleanValue", inner)),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(decode_double(inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| malformed(kind, inner)),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>>>()?,
                Some(other) => return Err(malformed("arrayValue.values", other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields),
            Some(other) => Err(malformed("mapValue.fields", other)),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(malformed(&format!("unsupported value type {}", other), inner)),
    }
}

fn decode_integer(inner: &Value) -> Result<Value> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| malformed("integerValue", inner)),
        Value::Number(n) => Ok(Value::Number(n.clone())),
        _ => Err(malformed("integerValue", inner)),
    }
}

// NaN / Infinity 以字串傳回，JSON 無法表示，轉成 null
fn decode_double(inner: &Value) -> Value {
    inner
        .as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Value> {
    let mut decoded = Map::new();
    for (key, value) in fields {
        decoded.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(decoded))
}

/// 序列化成 Firestore 文件的 `fields`
pub fn to_fields<T: Serialize>(document: &T) -> Result<Value> {
    match serde_json::to_value(document)? {
        Value::Object(map) => Ok(encode_fields(&map)),
        other => Err(malformed("document must serialize to an object", &other)),
    }
}

pub fn from_fields<T: DeserializeOwned>(fields: &Map<String, Value>) -> Result<T> {
    Ok(serde_json::from_value(decode_fields(fields)?)?)
}

fn malformed(what: &str, value: &Value) -> ServiceError {
    ServiceError::store(format!("Malformed Firestore value ({}): {}", what, value))
}
