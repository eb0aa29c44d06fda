use crate::client::ConfigurableHttpClient;
use crate::error::HttpError;
use crate::response::HttpResponse;
use async_trait::async_trait;
use serde::Serialize;

/// Verb operations of a per-service REST client.
///
/// Implementors embed a [`ConfigurableHttpClient`] and expose it through
/// [`http`](Self::http); the verbs are provided on top of it and may be
/// overridden, e.g. to add service-specific headers.
///
/// ```ignore
/// struct BillingClient {
///     http: ConfigurableHttpClient,
/// }
///
/// impl HttpVerbClient for BillingClient {
///     fn http(&self) -> &ConfigurableHttpClient {
///         &self.http
///     }
/// }
///
/// let invoices = billing.get("invoices").await?.json::<Vec<Invoice>>()?;
/// ```
#[async_trait]
pub trait HttpVerbClient: Send + Sync {
    /// The composed adapter requests go through.
    fn http(&self) -> &ConfigurableHttpClient;

    /// # Errors
    /// See [`ConfigurableHttpClient::get`].
    async fn get(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.http().get(path).await
    }

    /// # Errors
    /// See [`ConfigurableHttpClient::post`].
    async fn post<B>(&self, path: &str, body: &B) -> Result<HttpResponse, HttpError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.http().post(path, body).await
    }

    /// # Errors
    /// See [`ConfigurableHttpClient::put`].
    async fn put<B>(&self, path: &str, body: &B) -> Result<HttpResponse, HttpError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.http().put(path, body).await
    }

    /// # Errors
    /// See [`ConfigurableHttpClient::delete`].
    async fn delete(&self, path: &str) -> Result<HttpResponse, HttpError> {
        self.http().delete(path).await
    }
}

impl HttpVerbClient for ConfigurableHttpClient {
    fn http(&self) -> &ConfigurableHttpClient {
        self
    }
}
