//! Common building blocks for the IndieAuth client crates.
//!
//! This crate holds the pieces with no protocol semantics of their own: the
//! pluggable HTTP client seam, the response validator every request passes
//! through, and the URL conformance rules IndieAuth places on identifiers.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction and the response validator.
pub mod http_client;
pub mod url_rule;

pub use error::{HttpStatusError, ResponseError, TransportError};
pub use http_client::{HttpClient, HttpClientExt, ResponseUrl};
pub use url_rule::{UrlConformanceError, UrlKind, UrlRule};
