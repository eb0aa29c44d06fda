use crate::builder::HttpClientBuilder;
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::{HttpError, SettingsError};
use crate::handle::HttpClientHandle;
use crate::request::RequestOptions;
use crate::response::HttpResponse;
use crate::settings::Settings;
use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Verb-oriented REST client with validated settings.
///
/// The held [`HttpClientHandle`] is built from the settings as they are at
/// construction. Changing headers, base URI or extension settings afterwards
/// updates what the accessors report, not where or how requests are sent.
///
/// # Example
///
/// ```ignore
/// let mut settings = Settings::new();
/// settings.set_base_uri("https://api.example.com/v1/")?;
/// settings.merge_headers([("Accept", "application/json")]);
///
/// let client = ConfigurableHttpClient::with_settings(settings)?;
/// let user: User = client.get("users/42").await?.json()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigurableHttpClient {
    http_client: HttpClientHandle,
    settings: Settings,
}

impl ConfigurableHttpClient {
    /// Client with empty settings and the default HTTP configuration.
    ///
    /// # Errors
    /// Returns `HttpError::Tls` if TLS initialization fails.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_settings(Settings::new())
    }

    /// Client whose handle is built from `settings`.
    ///
    /// Uses the default HTTP configuration, except that an `http://` base URI
    /// switches the transport to `AllowInsecureHttp`.
    ///
    /// # Errors
    /// Returns `HttpError` if the handle cannot be built, e.g. a default
    /// header that is not a valid HTTP header.
    pub fn with_settings(settings: Settings) -> Result<Self, HttpError> {
        let config = HttpClientConfig {
            transport: transport_for(&settings),
            ..HttpClientConfig::default()
        };
        Self::with_config(settings, config)
    }

    /// Client whose handle is built from `settings` and `config`.
    ///
    /// # Errors
    /// Same as [`with_settings`](Self::with_settings), plus
    /// `HttpError::InvalidScheme` when `settings` has an `http://` base URI
    /// and `config` is `TlsOnly`.
    pub fn with_config(settings: Settings, config: HttpClientConfig) -> Result<Self, HttpError> {
        let http_client = HttpClientBuilder::with_config(config)
            .settings(&settings)
            .build()?;
        Ok(Self {
            http_client,
            settings,
        })
    }

    /// HTTP GET
    ///
    /// # Errors
    /// Transport errors from the handle, unchanged.
    pub async fn get(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.send(Method::GET, path, RequestOptions::new()).await
    }

    /// HTTP POST with `body` as JSON
    ///
    /// # Errors
    /// `HttpError::Json` if `body` does not serialize, otherwise transport
    /// errors from the handle, unchanged.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<HttpResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    /// HTTP PUT with `body` as JSON
    ///
    /// # Errors
    /// Same as [`post`](Self::post).
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<HttpResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, RequestOptions::new().json(body)?)
            .await
    }

    /// HTTP DELETE
    ///
    /// # Errors
    /// Transport errors from the handle, unchanged.
    pub async fn delete(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.send(Method::DELETE, path, RequestOptions::new()).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        self.http_client.request(method, path, options).await
    }

    /// Merge `values` into the headers; existing names are overwritten.
    pub fn set_headers<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.settings.merge_headers(values);
    }

    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        self.settings.headers()
    }

    /// # Errors
    /// Returns `SettingsError::InvalidBaseUri` unless `uri` is an absolute URL.
    pub fn set_base_uri(&mut self, uri: impl Into<String>) -> Result<(), SettingsError> {
        self.settings.set_base_uri(uri)
    }

    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.settings.base_uri()
    }

    /// Store an extension setting.
    ///
    /// # Errors
    /// Returns `SettingsError::ReservedKey` for `headers` and `base_uri`.
    pub fn set_settings(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), SettingsError> {
        self.settings.set(key, value)
    }

    /// Read settings.
    ///
    /// `None` returns the whole mapping, reserved keys included:
    /// `{"headers": {}, "base_uri": ""}` on a fresh client.
    ///
    /// # Errors
    /// Returns `SettingsError::ReservedKey` for `headers` and `base_uri`,
    /// `SettingsError::NotFound` for a key that was never set.
    pub fn get_settings(&self, key: Option<&str>) -> Result<Value, SettingsError> {
        match key {
            None => Ok(self.settings.to_value()),
            Some(key) => self.settings.get(key).cloned(),
        }
    }

    /// Read an extension setting decoded into `T`.
    ///
    /// # Errors
    /// As [`get_settings`](Self::get_settings), plus `SettingsError::Decode`.
    pub fn get_settings_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
        self.settings.get_as(key)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The held HTTP client, for requests the verb methods do not cover.
    #[must_use]
    pub fn http_client_handle(&self) -> &HttpClientHandle {
        &self.http_client
    }
}

/// Plain HTTP only when the base URI asks for it.
fn transport_for(settings: &Settings) -> TransportSecurity {
    match Url::parse(settings.base_uri()) {
        Ok(base) if base.scheme() == "http" => TransportSecurity::AllowInsecureHttp,
        _ => TransportSecurity::TlsOnly,
    }
}
