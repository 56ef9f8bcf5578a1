//! Reading the backend's JSON envelopes.
//!
//! Error bodies carry a `message` field. List endpoints answer either with a
//! bare array or with an object holding the array under a named key.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shown when a failed response has no usable `message`.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// The `message` of an error body, or [`GENERIC_ERROR_MESSAGE`].
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map_or_else(|| GENERIC_ERROR_MESSAGE.to_owned(), str::to_owned)
}

/// Decode a list that may arrive bare or wrapped as `{ key: [...] }`.
///
/// # Errors
///
/// Returns the decode error when the array's elements don't match `T`.
/// A body with neither shape decodes as an empty list.
pub fn extract_list<T: DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Array(_) => serde_json::from_value(value),
        Value::Object(mut map) => match map.remove(key) {
            Some(list @ Value::Array(_)) => serde_json::from_value(list),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// Decode a single record that may arrive bare or wrapped as `{ key: {...} }`.
///
/// # Errors
///
/// Returns the decode error when neither shape matches `T`.
pub fn extract_one<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            serde_json::from_value(map.remove(key).unwrap_or_default())
        }
        other => serde_json::from_value(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_message_prefers_body_message() {
        assert_eq!(error_message(r#"{"message":"Out of stock"}"#), "Out of stock");
        assert_eq!(error_message(r#"{"message":"  "}"#), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message("<html>502</html>"), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message(""), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_extract_list_shapes() {
        let bare: Vec<u32> = extract_list(json!([1, 2]), "items").unwrap();
        assert_eq!(bare, vec![1, 2]);

        let wrapped: Vec<u32> = extract_list(json!({"items": [3]}), "items").unwrap();
        assert_eq!(wrapped, vec![3]);

        let missing: Vec<u32> = extract_list(json!({"other": [3]}), "items").unwrap();
        assert!(missing.is_empty());

        assert!(extract_list::<u32>(json!(["x"]), "items").is_err());
    }

    #[test]
    fn test_extract_one_shapes() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Thing {
            name: String,
        }

        let bare: Thing = extract_one(json!({"name": "a"}), "thing").unwrap();
        assert_eq!(bare.name, "a");

        let wrapped: Thing = extract_one(json!({"thing": {"name": "b"}}), "thing").unwrap();
        assert_eq!(wrapped.name, "b");
    }
}
