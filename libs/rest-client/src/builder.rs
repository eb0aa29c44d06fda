use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::{HttpError, InvalidUriKind};
use crate::handle::{HttpClientHandle, HttpService};
use crate::layers::DefaultHeadersLayer;
use crate::response::ResponseBody;
use crate::settings::Settings;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneSyncService;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use url::Url;

/// Builder for a [`HttpClientHandle`].
///
/// The base URI and default headers given here are fixed for the lifetime
/// of the built handle.
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    base_uri: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response body size
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set transport security mode
    ///
    /// Use `TransportSecurity::AllowInsecureHttp` only for plain-HTTP endpoints
    /// you control, such as local mock servers.
    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Allow insecure HTTP connections (for testing only)
    ///
    /// Equivalent to `.transport(TransportSecurity::AllowInsecureHttp)`.
    ///
    /// Only available in debug builds or with the `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        tracing::warn!(
            target: "rest_client::security",
            "allow_insecure_http() called - HTTP traffic will NOT be encrypted"
        );
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Set TLS root certificate strategy
    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    /// Base URI that relative request paths are resolved against.
    ///
    /// An empty string means no base URI.
    #[must_use]
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Headers sent with every request unless the request sets them itself
    #[must_use]
    pub fn default_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Take base URI and default headers from a settings snapshot.
    #[must_use]
    pub fn settings(self, settings: &Settings) -> Self {
        self.base_uri(settings.base_uri())
            .default_headers(settings.headers().clone())
    }

    /// Build the handle.
    ///
    /// Needs no async runtime; requests made through the handle do.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUri` for an unparsable base URI,
    /// `HttpError::InvalidScheme` for an `http://` base URI under `TlsOnly`,
    /// `HttpError::InvalidHeaderName` / `HttpError::InvalidHeaderValue` for bad
    /// default headers, and `HttpError::Tls` if TLS initialization fails.
    pub fn build(self) -> Result<HttpClientHandle, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                "insecure HTTP enabled (TransportSecurity::AllowInsecureHttp); \
                 use only for testing with mock servers"
            );
        }

        let base_uri = parse_base_uri(self.base_uri.as_deref())?;
        if self.config.transport == TransportSecurity::TlsOnly
            && base_uri.as_ref().is_some_and(|base| base.scheme() == "http")
        {
            return Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "http:// base URI requires TransportSecurity::AllowInsecureHttp".to_owned(),
            });
        }
        let timeout = self.config.request_timeout;

        let https = tls::build_https_connector(self.config.tls_roots, self.config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        client_builder.pool_timer(TokioTimer::new()).http2_only(false);
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let headers_layer = DefaultHeadersLayer::try_new(
            self.default_headers
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
            &self.config.user_agent,
        )?;
        let default_headers = headers_layer.headers().clone();

        // Request flow (outer → inner):
        //   ErrorMapping → Timeout → DefaultHeaders → Decompression → hyper_client
        //
        // Every HTTP status comes back as Ok(Response); only transport,
        // timeout and TLS failures are errors.
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(headers_layer)
            .layer(DecompressionLayer::new())
            .service(hyper_client);

        let service = service
            .map_response(map_decompression_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

        let service: HttpService = BoxCloneSyncService::new(service);

        tracing::debug!(
            base_uri = base_uri.as_ref().map_or("", Url::as_str),
            default_headers = default_headers.len(),
            "http client handle built"
        );

        Ok(HttpClientHandle::new(
            service,
            base_uri,
            default_headers,
            self.config.max_body_size,
            self.config.transport,
        ))
    }
}

fn parse_base_uri(base_uri: Option<&str>) -> Result<Option<Url>, HttpError> {
    match base_uri {
        None | Some("") => Ok(None),
        Some(raw) => Url::parse(raw).map(Some).map_err(|e| HttpError::InvalidUri {
            url: raw.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        }),
    }
}

/// Map tower errors to `HttpError` with the configured timeout
///
/// Errors that already are `HttpError` are unwrapped; anything else from
/// the connection is passed through as `Transport`.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

/// Box the decompression body into [`ResponseBody`].
fn map_decompression_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    let boxed_body: ResponseBody = body.map_err(Into::into).boxed();
    Response::from_parts(parts, boxed_body)
}
