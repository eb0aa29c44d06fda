use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::json;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, Request};
use http_body_util::Full;
use serde::Serialize;
use url::Url;

/// Per-request options passed to [`HttpClientHandle::request`](crate::HttpClientHandle::request).
///
/// # Example
///
/// ```ignore
/// let options = RequestOptions::new()
///     .header("x-request-id", "abc123")?
///     .json(&NewOrder { sku: "A-1", quantity: 2 })?;
///
/// let resp = handle.request(Method::POST, "orders", options).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(HeaderName, HeaderValue)>,
    json: Option<Bytes>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header to this request only.
    ///
    /// Overrides a default header of the same name.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderName` / `HttpError::InvalidHeaderValue`.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HttpError> {
        self.headers
            .push((HeaderName::try_from(name)?, HeaderValue::try_from(value)?));
        Ok(self)
    }

    /// Send `body` serialized as JSON.
    ///
    /// Sets `Content-Type: application/json` unless a Content-Type header was given.
    ///
    /// # Errors
    /// Returns `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        self.json = Some(json::encode(body)?);
        Ok(self)
    }

    pub(crate) fn into_request(
        self,
        method: Method,
        uri: http::Uri,
    ) -> Result<Request<Full<Bytes>>, HttpError> {
        let mut builder = Request::builder().method(method).uri(uri);

        let has_content_type = self
            .headers
            .iter()
            .any(|(name, _)| name == http::header::CONTENT_TYPE);
        if self.json.is_some() && !has_content_type {
            builder = builder.header(http::header::CONTENT_TYPE, json::JSON_CONTENT_TYPE);
        }

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        Ok(builder.body(Full::new(self.json.unwrap_or_default()))?)
    }
}

/// Resolve `path` against `base` and check the scheme.
///
/// Absolute URLs are used as-is; anything else is an RFC 3986 reference
/// resolved against the base URI, so `users` under `https://api.example.com/v2/`
/// becomes `https://api.example.com/v2/users` while `/users` becomes
/// `https://api.example.com/users`.
pub(crate) fn resolve_url(
    base: Option<&Url>,
    path: &str,
    transport: TransportSecurity,
) -> Result<http::Uri, HttpError> {
    let invalid = |kind: InvalidUriKind, reason: String| HttpError::InvalidUri {
        url: path.to_owned(),
        kind,
        reason,
    };

    let url = match Url::parse(path) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                invalid(
                    InvalidUriKind::MissingBase,
                    "relative path and no base URI configured".to_owned(),
                )
            })?;
            base.join(path)
                .map_err(|e| invalid(InvalidUriKind::ParseError, e.to_string()))?
        }
        Err(e) => return Err(invalid(InvalidUriKind::ParseError, e.to_string())),
    };

    if !url.has_host() {
        return Err(invalid(
            InvalidUriKind::MissingAuthority,
            "missing host/authority".to_owned(),
        ));
    }

    match (url.scheme(), transport) {
        ("https", _) | ("http", TransportSecurity::AllowInsecureHttp) => {}
        ("http", TransportSecurity::TlsOnly) => {
            return Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
            });
        }
        (scheme, _) => {
            return Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            });
        }
    }

    url.as_str()
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_relative_path_joined_to_base() {
        let base = base("https://api.example.com/v2/");
        let uri = resolve_url(Some(&base), "users/42", TransportSecurity::TlsOnly).unwrap();
        assert_eq!(uri, "https://api.example.com/v2/users/42");
    }

    #[test]
    fn test_root_relative_path_replaces_base_path() {
        let base = base("https://api.example.com/v2/");
        let uri = resolve_url(Some(&base), "/health", TransportSecurity::TlsOnly).unwrap();
        assert_eq!(uri, "https://api.example.com/health");
    }

    #[test]
    fn test_absolute_path_overrides_base() {
        let base = base("https://api.example.com/v2/");
        let uri =
            resolve_url(Some(&base), "https://other.example.com/get", TransportSecurity::TlsOnly)
                .unwrap();
        assert_eq!(uri, "https://other.example.com/get");
    }

    #[test]
    fn test_relative_path_without_base() {
        match resolve_url(None, "users", TransportSecurity::TlsOnly) {
            Err(HttpError::InvalidUri { url, kind, .. }) => {
                assert_eq!(url, "users");
                assert_eq!(kind, InvalidUriKind::MissingBase);
            }
            other => panic!("Expected InvalidUri error, got: {other:?}"),
        }
    }

    #[test]
    fn test_http_rejected_with_tls_only() {
        match resolve_url(None, "http://example.com/test", TransportSecurity::TlsOnly) {
            Err(HttpError::InvalidScheme { scheme, reason }) => {
                assert_eq!(scheme, "http");
                assert!(reason.contains("TlsOnly"), "Error should mention TlsOnly: {reason}");
            }
            other => panic!("Expected InvalidScheme error, got: {other:?}"),
        }
    }

    #[test]
    fn test_http_allowed_with_insecure() {
        let uri = resolve_url(
            None,
            "http://127.0.0.1:8080/test",
            TransportSecurity::AllowInsecureHttp,
        )
        .unwrap();
        assert_eq!(uri.scheme_str(), Some("http"));
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let result = resolve_url(
            None,
            "ftp://files.example.com/file.txt",
            TransportSecurity::AllowInsecureHttp,
        );
        assert!(matches!(result, Err(HttpError::InvalidScheme { scheme, .. }) if scheme == "ftp"));
    }

    #[test]
    fn test_missing_host_rejected() {
        let result = resolve_url(None, "mailto:ops@example.com", TransportSecurity::TlsOnly);
        assert!(matches!(
            result,
            Err(HttpError::InvalidUri {
                kind: InvalidUriKind::MissingAuthority,
                ..
            })
        ));
    }

    #[test]
    fn test_json_sets_content_type() {
        let request = RequestOptions::new()
            .json(&json!({"foo": "bar"}))
            .unwrap()
            .into_request(Method::POST, "https://example.com/".parse().unwrap())
            .unwrap();

        assert_eq!(request.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_explicit_content_type_not_duplicated() {
        let request = RequestOptions::new()
            .header("content-type", "application/vnd.custom+json")
            .unwrap()
            .json(&json!({"value": 42}))
            .unwrap()
            .into_request(Method::PUT, "https://example.com/".parse().unwrap())
            .unwrap();

        let values: Vec<_> = request
            .headers()
            .get_all("content-type")
            .iter()
            .collect();
        assert_eq!(values, vec!["application/vnd.custom+json"]);
    }

    #[test]
    fn test_no_body_no_content_type() {
        let request = RequestOptions::new()
            .into_request(Method::GET, "https://example.com/".parse().unwrap())
            .unwrap();
        assert!(request.headers().get("content-type").is_none());
    }

    #[test]
    fn test_invalid_header_rejected() {
        assert!(matches!(
            RequestOptions::new().header("bad header", "x"),
            Err(HttpError::InvalidHeaderName(_))
        ));
    }
}
