//! IndieAuth client: discover a user's authorization server from their
//! profile URL, send them through a PKCE-protected authorization request, and
//! manage the resulting tokens.
//!
//! The building blocks are usable on their own:
//! [`discovery`] finds endpoints, [`authorize`] builds the redirect URL and
//! [`request`] performs redeem, refresh, verify and revoke against a token
//! endpoint. [`IndieAuthClient`] ties them together and chooses between the
//! current protocol and its legacy variant for each call.
//!
//! ```no_run
//! # async fn run() -> indieauth::error::Result<()> {
//! use indieauth::{ClientConfig, IndieAuthClient};
//! use url::Url;
//!
//! let config = ClientConfig::new()
//!     .client_id(Url::parse("https://app.example.com/")?)
//!     .redirect_uri(Url::parse("https://app.example.com/callback")?)
//!     .build()?;
//! let client = IndieAuthClient::new(reqwest::Client::new(), config);
//!
//! let server = client.discover("user.example.net").await?;
//! let pending = client.start_authorization(&server, Some("profile"), None)?;
//! // redirect the user to `pending.url`, keep `pending` until they return
//! # let callback = pending.url.clone();
//! let response = client.finish_callback(&pending, &callback)?;
//! let tokens = client.redeem(&pending, &response).await?;
//! # let _ = tokens;
//! # Ok(())
//! # }
//! ```

pub mod authorize;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod pkce;
pub mod request;
pub mod types;

#[cfg(feature = "blocking")]
pub mod blocking;

#[cfg(test)]
mod test_support;

pub use client::{IndieAuthClient, PendingAuthorization};
pub use config::{ClientConfig, ensure_conformance};
pub use discovery::{DiscoveredServer, IndieAuthResolver, ProfileDocument};
pub use error::{Error, Result};
pub use indieauth_common::{self as common, HttpClient, UrlKind, UrlRule};
