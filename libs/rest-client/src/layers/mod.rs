//! Tower layers of the HTTP client stack
//!
//! - [`DefaultHeadersLayer`] - Adds snapshot headers and User-Agent to requests that lack them

mod default_headers;

pub use default_headers::{DefaultHeadersLayer, DefaultHeadersService};
