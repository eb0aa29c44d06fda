#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Configurable REST client adapter
//!
//! [`ConfigurableHttpClient`] wraps a hyper-based HTTP stack behind four verb
//! methods (`get`, `post`, `put`, `delete`) and keeps a small settings
//! mapping:
//! - `headers`: default request headers, merged with [`ConfigurableHttpClient::set_headers`]
//! - `base_uri`: absolute URL relative paths resolve against
//! - any other key: free-form JSON values for the service built on top
//!
//! The HTTP handle is built once from the settings given at construction.
//! Changing settings later does not reconfigure it.
//!
//! Per-service clients compose a `ConfigurableHttpClient` and implement
//! [`HttpVerbClient`].
//!
//! The HTTP stack itself:
//! - TLS via rustls (HTTPS only by default)
//! - Per-request timeout
//! - User-Agent and default header injection
//! - Transparent response decompression (gzip, brotli, deflate)
//! - Response bodies buffered up to a configurable limit
//!
//! Every HTTP status is returned as `Ok(HttpResponse)`; use
//! [`HttpResponse::error_for_status`] to treat non-2xx as errors.
//!
//! # Example
//!
//! ```ignore
//! use rest_client::{ConfigurableHttpClient, Settings};
//! use serde_json::json;
//!
//! let mut settings = Settings::new();
//! settings.set_base_uri("https://api.example.com/v1/")?;
//! settings.merge_headers([("Authorization", "Bearer token")]);
//!
//! let client = ConfigurableHttpClient::with_settings(settings)?;
//! let created = client
//!     .post("orders", &json!({"sku": "A-1", "quantity": 2}))
//!     .await?
//!     .error_for_status()?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod handle;
pub mod json;
mod layers;
mod request;
mod response;
mod settings;
mod tls;
mod verb;

pub use builder::HttpClientBuilder;
pub use client::ConfigurableHttpClient;
pub use config::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind, SettingsAccess, SettingsError};
pub use handle::HttpClientHandle;
pub use layers::{DefaultHeadersLayer, DefaultHeadersService};
pub use request::RequestOptions;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse, ResponseBody};
pub use settings::{BASE_URI_KEY, HEADERS_KEY, RESERVED_KEYS, Settings, is_reserved_key};
pub use verb::HttpVerbClient;
