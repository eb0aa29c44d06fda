use std::fmt;
use thiserror::Error;

/// Classification of URL resolution failures.
///
/// Lets callers match on the failure mode without parsing the unstable
/// `reason` string carried by [`HttpError::InvalidUri`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL (or path reference) could not be parsed
    ParseError,
    /// Path is relative but no base URI was configured when the client was built
    MissingBase,
    /// Resolved URL has no host component
    MissingAuthority,
}

/// Errors raised by the HTTP stack while building or sending a request.
///
/// Verb methods on [`ConfigurableHttpClient`](crate::ConfigurableHttpClient)
/// return these unchanged; nothing in the adapter catches, rewraps or retries them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request timed out
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body exceeded size limit
    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// HTTP non-2xx status, raised only by the checked response readers
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    /// JSON encoding or decoding failed
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be resolved
    ///
    /// Match on `kind`; `reason` is a diagnostic message for logs only.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        /// The path or URL as passed by the caller
        url: String,
        /// Structured failure classification for programmatic matching
        kind: InvalidUriKind,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },

    /// URL scheme rejected by the transport security configuration
    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme {
        /// The URL scheme that was rejected
        scheme: String,
        /// Reason the scheme was rejected
        reason: String,
    },
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

/// Which generic settings accessor hit a reserved key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAccess {
    /// `set_settings`
    Set,
    /// `get_settings`
    Get,
}

impl fmt::Display for SettingsAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsAccess::Set => f.write_str("set"),
            SettingsAccess::Get => f.write_str("read"),
        }
    }
}

/// Errors raised by the settings accessors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    /// Base URI is not a well-formed absolute URL
    #[error("invalid base URI")]
    InvalidBaseUri {
        /// The rejected value
        uri: String,
    },

    /// `headers` or `base_uri` went through the generic settings accessor
    #[error("cannot {access} reserved key '{key}' through generic settings; use its dedicated accessor")]
    ReservedKey {
        /// The reserved key
        key: String,
        /// Whether the caller tried to write or read it
        access: SettingsAccess,
    },

    /// Requested settings key was never set
    #[error("settings key '{key}' does not exist")]
    NotFound {
        /// The missing key
        key: String,
    },

    /// Stored value could not be decoded into the requested type
    #[error("settings key '{key}' has an unexpected shape: {reason}")]
    Decode {
        /// The key whose value failed to decode
        key: String,
        /// Decoder message
        reason: String,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Error for TestError {}

    #[test]
    fn test_transport_error_preserves_source() {
        let err = HttpError::Transport(Box::new(TestError("connection refused")));

        let source = err.source().expect("Transport error should have a source");
        let downcast = source.downcast_ref::<TestError>();
        assert_eq!(downcast.map(|e| e.0), Some("connection refused"));
    }

    #[test]
    fn test_invalid_base_uri_message() {
        let err = SettingsError::InvalidBaseUri {
            uri: "mercadolivre.com.br".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid base URI");
    }

    #[test]
    fn test_reserved_key_messages_differ_by_access() {
        let set = SettingsError::ReservedKey {
            key: "headers".to_owned(),
            access: SettingsAccess::Set,
        };
        let get = SettingsError::ReservedKey {
            key: "headers".to_owned(),
            access: SettingsAccess::Get,
        };

        assert!(set.to_string().starts_with("cannot set reserved key 'headers'"));
        assert!(get.to_string().starts_with("cannot read reserved key 'headers'"));
        assert_ne!(set.to_string(), get.to_string());
    }
}
