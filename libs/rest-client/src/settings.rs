use crate::error::{SettingsAccess, SettingsError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::Url;

/// Reserved key holding the default request headers.
pub const HEADERS_KEY: &str = "headers";

/// Reserved key holding the base URI.
pub const BASE_URI_KEY: &str = "base_uri";

/// Keys that only their dedicated accessors may touch.
pub const RESERVED_KEYS: [&str; 2] = [HEADERS_KEY, BASE_URI_KEY];

/// Settings mapping of a [`ConfigurableHttpClient`](crate::ConfigurableHttpClient).
///
/// Holds the two reserved entries (`headers`, `base_uri`) plus arbitrary
/// extension keys. Serializes to a single flat JSON object:
///
/// ```ignore
/// {"headers": {"accept": "application/json"}, "base_uri": "https://api.example.com", "auth": ["Foo", "Bar"]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    headers: BTreeMap<String, String>,
    base_uri: String,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `values` into the headers; existing names are overwritten.
    pub fn merge_headers<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Store `uri` as the base URI.
    ///
    /// Only absolute URLs with a host are accepted (`https://api.example.com/v2/`).
    ///
    /// # Errors
    /// Returns `SettingsError::InvalidBaseUri` for anything else, including
    /// bare host names such as `example.com`.
    pub fn set_base_uri(&mut self, uri: impl Into<String>) -> Result<(), SettingsError> {
        let uri = uri.into();
        if !is_absolute_url(&uri) {
            return Err(SettingsError::InvalidBaseUri { uri });
        }
        self.base_uri = uri;
        Ok(())
    }

    /// Stored base URI; empty until [`set_base_uri`](Self::set_base_uri) succeeds.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Store `value` under an extension key, overwriting any previous value.
    ///
    /// # Errors
    /// Returns `SettingsError::ReservedKey` for `headers` and `base_uri`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), SettingsError> {
        let key = key.into();
        ensure_not_reserved(&key, SettingsAccess::Set)?;
        self.extra.insert(key, value.into());
        Ok(())
    }

    /// Value stored under an extension key.
    ///
    /// # Errors
    /// Returns `SettingsError::ReservedKey` for `headers` and `base_uri`,
    /// `SettingsError::NotFound` if the key was never set or holds `null`.
    pub fn get(&self, key: &str) -> Result<&Value, SettingsError> {
        ensure_not_reserved(key, SettingsAccess::Get)?;
        self.extra
            .get(key)
            .filter(|value| !value.is_null())
            .ok_or_else(|| SettingsError::NotFound {
                key: key.to_owned(),
            })
    }

    /// Value stored under an extension key, decoded into `T`.
    ///
    /// # Errors
    /// Same as [`get`](Self::get), plus `SettingsError::Decode` when the
    /// stored value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
        T::deserialize(self.get(key)?).map_err(|e| SettingsError::Decode {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }

    /// The whole mapping, reserved keys included, as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.extra.len() + RESERVED_KEYS.len());
        map.insert(
            HEADERS_KEY.to_owned(),
            Value::Object(
                self.headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        map.insert(BASE_URI_KEY.to_owned(), Value::String(self.base_uri.clone()));
        map.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(map)
    }
}

/// Whether `key` is only reachable through a dedicated accessor.
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

fn ensure_not_reserved(key: &str, access: SettingsAccess) -> Result<(), SettingsError> {
    if is_reserved_key(key) {
        return Err(SettingsError::ReservedKey {
            key: key.to_owned(),
            access,
        });
    }
    Ok(())
}

fn is_absolute_url(uri: &str) -> bool {
    // `Url::parse` rejects relative references; `cannot-be-a-base` URLs such as
    // `mailto:` parse fine but carry no host.
    Url::parse(uri).is_ok_and(|url| url.has_host() && !url.cannot_be_a_base())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_BASE_URIS: &[&str] = &[
        "https://api-marketplace.bonmarketplace.com.br",
        "https://bling.com.br/Api/v2/",
        "https://api.cnova.com/api/v2/",
        "https://lojista.ehub.com.br/oauth-api/authorize",
        "https://api.cnova.com/oauth/access_token",
        "https://api.mercadolibre.com",
        "https://auth.mercadolibre.com.ar",
        "https://auth.mercadolivre.com.br",
        "https://auth.mercadolibre.cl",
        "http://open.api.sandbox.ebay.com/",
        "https://api-mp.walmart.com.br/ws/seller/%u/",
        "https://pandora.vtexcommercestable.com.br/api/",
        "https://api.tiny.com.br/api2/",
        "https://api.mercadoshops.com/v1/",
        "http://127.0.0.1:8080/",
    ];

    #[test]
    fn test_fresh_settings_value() {
        let settings = Settings::new();
        assert_eq!(settings.to_value(), json!({"headers": {}, "base_uri": ""}));
        assert!(settings.headers().is_empty());
        assert_eq!(settings.base_uri(), "");
    }

    #[test]
    fn test_merge_headers_adds_and_overwrites() {
        let mut settings = Settings::new();
        settings.merge_headers([("accept", "application/json"), ("x-api-key", "old")]);
        settings.merge_headers([("x-api-key", "new"), ("x-user-email", "jean@example.com")]);

        let expected: BTreeMap<String, String> = [
            ("accept", "application/json"),
            ("x-api-key", "new"),
            ("x-user-email", "jean@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        assert_eq!(settings.headers(), &expected);
    }

    #[test]
    fn test_valid_base_uris_round_trip() {
        for uri in VALID_BASE_URIS {
            let mut settings = Settings::new();
            settings.set_base_uri(*uri).unwrap();
            assert_eq!(settings.base_uri(), *uri);
        }
    }

    #[test]
    fn test_invalid_base_uris_rejected() {
        for uri in ["mercadolivre.com.br", "", "/api/v2", "mailto:someone@example.com", "https://"] {
            let mut settings = Settings::new();
            let err = settings.set_base_uri(uri).unwrap_err();
            assert_eq!(
                err,
                SettingsError::InvalidBaseUri {
                    uri: uri.to_owned()
                }
            );
            assert_eq!(settings.base_uri(), "", "rejected URI must not be stored");
        }
    }

    #[test]
    fn test_null_value_counts_as_unset() {
        let mut settings = Settings::new();
        settings.set("token", Value::Null).unwrap();
        assert_eq!(
            settings.get("token"),
            Err(SettingsError::NotFound {
                key: "token".to_owned()
            })
        );

        settings.set("token", "abc").unwrap();
        assert_eq!(settings.get("token"), Ok(&json!("abc")));
    }

    #[test]
    fn test_reserved_keys_rejected() {
        let mut settings = Settings::new();
        for key in RESERVED_KEYS {
            assert!(matches!(
                settings.set(key, json!([])),
                Err(SettingsError::ReservedKey {
                    access: SettingsAccess::Set,
                    ..
                })
            ));
            assert!(matches!(
                settings.get(key),
                Err(SettingsError::ReservedKey {
                    access: SettingsAccess::Get,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_missing_key() {
        let settings = Settings::new();
        assert_eq!(
            settings.get("NonexistentKey"),
            Err(SettingsError::NotFound {
                key: "NonexistentKey".to_owned()
            })
        );
    }

    #[test]
    fn test_extension_key_round_trip_and_overwrite() {
        let mut settings = Settings::new();
        settings.set("auth", vec!["Foo", "Bar"]).unwrap();
        assert_eq!(settings.get("auth").unwrap(), &json!(["Foo", "Bar"]));

        settings.set("auth", "token").unwrap();
        assert_eq!(settings.get("auth").unwrap(), &json!("token"));
    }

    #[test]
    fn test_get_as_decodes() {
        let mut settings = Settings::new();
        settings.set("auth", vec!["Foo", "Bar"]).unwrap();
        settings.set("page_size", 50).unwrap();

        let auth: Vec<String> = settings.get_as("auth").unwrap();
        assert_eq!(auth, vec!["Foo".to_owned(), "Bar".to_owned()]);

        let err = settings.get_as::<Vec<String>>("page_size").unwrap_err();
        assert!(matches!(err, SettingsError::Decode { ref key, .. } if key == "page_size"));
    }

    #[test]
    fn test_value_and_serialize_agree() {
        let mut settings = Settings::new();
        settings.merge_headers([("accept", "application/json")]);
        settings.set_base_uri("https://api.example.com/v1/").unwrap();
        settings.set("auth", vec!["Foo", "Bar"]).unwrap();

        let expected = json!({
            "headers": {"accept": "application/json"},
            "base_uri": "https://api.example.com/v1/",
            "auth": ["Foo", "Bar"],
        });
        assert_eq!(settings.to_value(), expected);
        assert_eq!(serde_json::to_value(&settings).unwrap(), expected);
    }
}
