//! Minimal HTTP client abstraction shared across crates.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use url::Url;

use crate::error::{HttpStatusError, ResponseError, TransportError};

/// HTTP client trait for sending raw HTTP requests.
///
/// Timeouts, cancellation and retries are the implementation's business;
/// whatever it reports as an error surfaces to callers as a
/// [`TransportError`].
#[trait_variant::make(Send)]
pub trait HttpClient {
    /// Error type returned by the HTTP client
    type Error: std::error::Error + Display + Send + Sync + 'static;

    /// Send an HTTP request and return the response.
    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>>;
}

/// Response extension naming the URL a response was actually served from.
///
/// Clients that follow redirects insert it so that relative references in
/// the body can be resolved against the final location rather than the one
/// requested. Absent means the requested URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseUrl(pub Url);

#[cfg(feature = "reqwest-client")]
impl HttpClient for reqwest::Client {
    type Error = TransportError;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
        // Convert http::Request to reqwest::Request
        let (parts, body) = request.into_parts();

        let mut req = self.request(parts.method, parts.uri.to_string()).body(body);

        // Copy headers
        for (name, value) in parts.headers.iter() {
            req = req.header(name.as_str(), value.as_bytes());
        }

        let resp = req.send().await?;

        // Convert reqwest::Response to http::Response
        let mut builder = http::Response::builder()
            .status(resp.status())
            .extension(ResponseUrl(resp.url().clone()));

        for (name, value) in resp.headers().iter() {
            builder = builder.header(name.as_str(), value.as_bytes());
        }

        let body = resp.bytes().await?.to_vec();

        builder
            .body(body)
            .map_err(|e| TransportError::Other(Box::new(e)))
    }
}

impl<T: HttpClient + Sync> HttpClient for Arc<T> {
    type Error = T::Error;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>> + Send
    {
        self.as_ref().send_http(request)
    }
}

/// Response validator: the single place where status-code policy lives.
///
/// Returns the response untouched when its status is in `200..=299`,
/// otherwise an [`HttpStatusError`] carrying the URL, status and body.
pub fn check_status(
    url: &str,
    response: http::Response<Vec<u8>>,
) -> Result<http::Response<Vec<u8>>, HttpStatusError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.into_body();
        Err(HttpStatusError {
            url: url.into(),
            status,
            body: (!body.is_empty()).then(|| bytes::Bytes::from(body)),
        })
    }
}

fn into_transport_error<E>(error: E) -> TransportError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error);
    match boxed.downcast::<TransportError>() {
        Ok(transport) => *transport,
        Err(other) => TransportError::Other(other),
    }
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip_all,
        fields(method = %request.method(), uri = %request.uri())
    )
)]
async fn send_impl<T: HttpClient + Sync + ?Sized>(
    client: &T,
    request: http::Request<Vec<u8>>,
) -> Result<http::Response<Vec<u8>>, ResponseError> {
    let url = request.uri().to_string();
    let response = client
        .send_http(request)
        .await
        .map_err(into_transport_error)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(status = %response.status(), "response received");
    Ok(check_status(&url, response)?)
}

async fn fetch_impl<T: HttpClient + Sync + ?Sized>(
    client: &T,
    url: &Url,
    accept: &str,
) -> Result<http::Response<Vec<u8>>, ResponseError> {
    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri(url.as_str())
        .header(http::header::ACCEPT, accept)
        .body(Vec::new())
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    send_impl(client, request).await
}

/// Validated round trips on top of any [`HttpClient`].
///
/// Every request made by the IndieAuth crates goes through one of these two
/// methods, so transport failures and non-2xx statuses are classified the
/// same way everywhere.
pub trait HttpClientExt: HttpClient {
    /// `GET` the URL with the given `Accept` header and validate the
    /// response status.
    fn fetch(
        &self,
        url: &Url,
        accept: &str,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, ResponseError>> + Send
    where
        Self: Sync,
    {
        fetch_impl(self, url, accept)
    }

    /// Send a prepared request and validate the response status.
    fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, ResponseError>> + Send
    where
        Self: Sync,
    {
        send_impl(self, request)
    }
}

impl<T: HttpClient + ?Sized> HttpClientExt for T {}
