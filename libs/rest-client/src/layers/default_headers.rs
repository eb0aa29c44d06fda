use crate::error::HttpError;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Request, Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that fills in default headers on every request
///
/// A header already present on the request is left untouched, so per-request
/// headers always win over the defaults.
#[derive(Clone)]
pub struct DefaultHeadersLayer {
    headers: Arc<HeaderMap>,
}

impl DefaultHeadersLayer {
    /// Build the layer from name/value pairs and a User-Agent.
    ///
    /// A `user-agent` entry among `headers` takes precedence over `user_agent`.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderName` / `HttpError::InvalidHeaderValue`
    /// for the first pair that is not a valid HTTP header.
    pub fn try_new<'a, I>(headers: I, user_agent: &str) -> Result<Self, HttpError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(HeaderName::try_from(name)?, HeaderValue::try_from(value)?);
        }
        if !map.contains_key(http::header::USER_AGENT) {
            map.insert(http::header::USER_AGENT, HeaderValue::try_from(user_agent)?);
        }
        Ok(Self {
            headers: Arc::new(map),
        })
    }

    /// The headers this layer applies.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeadersService {
            inner,
            headers: Arc::clone(&self.headers),
        }
    }
}

/// Service that adds default headers to requests
#[derive(Clone)]
pub struct DefaultHeadersService<S> {
    inner: S,
    headers: Arc<HeaderMap>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DefaultHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let request_headers = req.headers_mut();
        for (name, value) in self.headers.iter() {
            if !request_headers.contains_key(name) {
                request_headers.insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}
