//! JSON helpers shared by request bodies, response decoding and settings.

use crate::error::HttpError;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Content type sent with JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize `value` into a JSON request body.
///
/// # Errors
/// Returns `HttpError::Json` if `value` cannot be represented as JSON
/// (e.g. a map with non-string keys).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, HttpError> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Deserialize a JSON document.
///
/// # Errors
/// Returns `HttpError::Json` if `bytes` is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HttpError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[test]
    fn test_encode_map() {
        let body = encode(&json!({"foo": "bar"})).unwrap();
        assert_eq!(&body[..], br#"{"foo":"bar"}"#);
    }

    #[test]
    fn test_encode_already_encoded_string_is_quoted() {
        // A pre-encoded JSON string is still a string value
        let body = encode(r#"{"foo":"bar"}"#).unwrap();
        assert_eq!(&body[..], br#""{\"foo\":\"bar\"}""#);
    }

    #[test]
    fn test_encode_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");

        assert!(matches!(encode(&map), Err(HttpError::Json(_))));
    }

    #[test]
    fn test_decode() {
        let value: Value = decode(br#"{"items":[1,2]}"#).unwrap();
        assert_eq!(value, json!({"items": [1, 2]}));
    }

    #[test]
    fn test_decode_invalid() {
        let result: Result<Value, _> = decode(b"not json");
        assert!(matches!(result, Err(HttpError::Json(_))));
    }
}
