use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::{RequestOptions, resolve_url};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::Full;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;
use url::Url;

/// Type-erased middleware stack behind a handle.
pub(crate) type HttpService =
    BoxCloneSyncService<http::Request<Full<Bytes>>, http::Response<ResponseBody>, HttpError>;

/// Configured HTTP client
///
/// Built once from a settings snapshot; its base URI and default headers
/// never change afterwards. Cloning is cheap and clones share the
/// connection pool.
#[derive(Clone)]
pub struct HttpClientHandle {
    service: HttpService,
    base_uri: Option<Url>,
    default_headers: HeaderMap,
    max_body_size: usize,
    transport: TransportSecurity,
}

impl std::fmt::Debug for HttpClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientHandle")
            .field("base_uri", &self.base_uri.as_ref().map(Url::as_str))
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .field("max_body_size", &self.max_body_size)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl HttpClientHandle {
    pub(crate) fn new(
        service: HttpService,
        base_uri: Option<Url>,
        default_headers: HeaderMap,
        max_body_size: usize,
        transport: TransportSecurity,
    ) -> Self {
        Self {
            service,
            base_uri,
            default_headers,
            max_body_size,
            transport,
        }
    }

    /// Create a builder for configuring a handle
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Base URI relative paths resolve against, if one was configured.
    #[must_use]
    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    /// Headers added to every request that does not set them itself,
    /// User-Agent included.
    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    #[must_use]
    pub fn transport(&self) -> TransportSecurity {
        self.transport
    }

    /// Send a request and buffer the response.
    ///
    /// `path` is either an absolute URL or a reference resolved against the
    /// base URI. Every HTTP status, 4xx and 5xx included, is returned as
    /// `Ok`.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUri` / `HttpError::InvalidScheme` when the
    /// target cannot be resolved, and the transport's own error
    /// (`Transport`, `Timeout`, `Tls`, `BodyTooLarge`) when the exchange fails.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, HttpError> {
        let uri = resolve_url(self.base_uri.as_ref(), path, self.transport)?;
        let request = options.into_request(method, uri)?;

        tracing::debug!(method = %request.method(), url = %request.uri(), "sending request");

        let response = self.service.clone().oneshot(request).await?;

        tracing::debug!(status = %response.status(), "received response");

        HttpResponse::from_streaming(response, self.max_body_size).await
    }
}
