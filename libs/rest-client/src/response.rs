use crate::error::HttpError;
use crate::json;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Maximum body preview size for status errors (8KB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Type-erased response body as produced by the decompression layer.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Buffered HTTP response
///
/// Verb methods return this for every HTTP status, 4xx and 5xx included;
/// use [`error_for_status`](Self::error_for_status) or the checked readers
/// to turn non-2xx statuses into errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// Read `response` to the end, failing if the body exceeds `max_body_size`.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` or `HttpError::Transport` when the
    /// body stream fails.
    pub async fn from_streaming(
        response: Response<ResponseBody>,
        max_body_size: usize,
    ) -> Result<Self, HttpError> {
        let (parts, body) = response.into_parts();
        let body = read_body_limited(body, max_body_size).await?;
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body (already decompressed)
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body as UTF-8 text; invalid sequences become U+FFFD.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Return `self` for 2xx statuses, an `HttpError::HttpStatus` otherwise.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` with a body preview if the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(self.status_error())
    }

    /// Parse the body as JSON after checking for a 2xx status.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx,
    /// `HttpError::Json` if parsing fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        if !self.status.is_success() {
            return Err(self.status_error());
        }
        json::decode(&self.body)
    }

    fn status_error(&self) -> HttpError {
        let content_type = self
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let preview_len = self.body.len().min(ERROR_BODY_PREVIEW_LIMIT);

        HttpError::HttpStatus {
            status: self.status,
            body_preview: String::from_utf8_lossy(&self.body[..preview_len]).into_owned(),
            content_type,
        }
    }
}

async fn read_body_limited(body: ResponseBody, limit: usize) -> Result<Bytes, HttpError> {
    let mut collected = BytesMut::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(collected.freeze())
}
