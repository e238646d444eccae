//! Token endpoint round trips: redeem, refresh, verify and revoke.
//!
//! Each operation comes as a pure request builder (`*_request`) and an async
//! function that sends it through [`HttpClientExt::send`], so the status
//! policy is the same for all of them.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request};
use indieauth_common::{HttpClient, HttpClientExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{
    LegacyRevocationRequest, RedemptionRequest, RedemptionResponse, RefreshTokenRequest,
    TokenRequest, VerificationResponse,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Statuses a legacy token endpoint uses to say "this token is no good".
const LEGACY_INACTIVE_STATUSES: &[u16] = &[400, 401, 403];

fn form_post<S: Serialize>(endpoint: &Url, body: S, accept_json: bool) -> Result<Request<Vec<u8>>> {
    let body = serde_html_form::to_string(body)?;
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(endpoint.as_str())
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE);
    if accept_json {
        builder = builder.header(ACCEPT, JSON_CONTENT_TYPE);
    }
    Ok(builder.body(body.into_bytes())?)
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Code redemption request.
pub fn redeem_request(endpoint: &Url, request: &RedemptionRequest) -> Result<Request<Vec<u8>>> {
    form_post(endpoint, request, true)
}

/// Refresh token request.
pub fn refresh_request(endpoint: &Url, request: &RefreshTokenRequest) -> Result<Request<Vec<u8>>> {
    form_post(endpoint, request, true)
}

/// Introspection request: `token=` in the body and as a bearer credential.
pub fn verify_request(endpoint: &Url, token: &str) -> Result<Request<Vec<u8>>> {
    let mut request = form_post(endpoint, TokenRequest { token }, true)?;
    request
        .headers_mut()
        .insert(AUTHORIZATION, bearer(token).parse().map_err(http::Error::from)?);
    Ok(request)
}

/// Legacy verification: a bare `GET` carrying only the bearer credential.
pub fn legacy_verify_request(endpoint: &Url, token: &str) -> Result<Request<Vec<u8>>> {
    Ok(Request::builder()
        .method(Method::GET)
        .uri(endpoint.as_str())
        .header(AUTHORIZATION, bearer(token))
        .body(Vec::new())?)
}

/// Revocation request.
pub fn revoke_request(endpoint: &Url, token: &str) -> Result<Request<Vec<u8>>> {
    form_post(endpoint, TokenRequest { token }, true)
}

/// Legacy revocation: `action=revoke&token=` posted to the token endpoint,
/// with no `Accept` header.
pub fn legacy_revoke_request(endpoint: &Url, token: &str) -> Result<Request<Vec<u8>>> {
    form_post(endpoint, LegacyRevocationRequest::new(token), false)
}

async fn send_json<T, O>(client: &T, request: Request<Vec<u8>>) -> Result<O>
where
    T: HttpClient + Sync + ?Sized,
    O: DeserializeOwned,
{
    let url = request.uri().to_string();
    let response = client.send(request).await?;
    serde_json::from_slice(response.body()).map_err(|e| Error::decode(url, e))
}

/// Exchange an authorization code.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn redeem<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    request: &RedemptionRequest,
) -> Result<RedemptionResponse> {
    send_json(client, redeem_request(endpoint, request)?).await
}

/// Exchange a refresh token for a new token set.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn refresh<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    request: &RefreshTokenRequest,
) -> Result<RedemptionResponse> {
    send_json(client, refresh_request(endpoint, request)?).await
}

/// Ask the introspection endpoint about a token.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn verify<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    token: &str,
) -> Result<VerificationResponse> {
    send_json(client, verify_request(endpoint, token)?).await
}

/// Ask a legacy token endpoint about a token.
///
/// A 400, 401 or 403 answer means the token is not valid and yields
/// [`VerificationResponse::inactive`]. A successful answer without an
/// `active` member counts as active.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn legacy_verify<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    token: &str,
) -> Result<VerificationResponse> {
    let request = legacy_verify_request(endpoint, token)?;
    let mut body: serde_json::Value = match send_json(client, request).await {
        Ok(body) => body,
        Err(Error::HttpStatus(e)) if e.status_in(LEGACY_INACTIVE_STATUSES) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(status = %e.status, "legacy token endpoint rejected token");
            return Ok(VerificationResponse::inactive());
        }
        Err(e) => return Err(e),
    };
    if let Some(object) = body.as_object_mut() {
        object.entry("active").or_insert(serde_json::Value::Bool(true));
    }
    serde_json::from_value(body).map_err(|e| Error::decode(endpoint, e))
}

/// Revoke a token. Any 2xx answer is success; the body is ignored.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn revoke<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    token: &str,
) -> Result<()> {
    client.send(revoke_request(endpoint, token)?).await?;
    Ok(())
}

/// Revoke a token at a legacy token endpoint.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint)))]
pub async fn legacy_revoke<T: HttpClient + Sync + ?Sized>(
    client: &T,
    endpoint: &Url,
    token: &str,
) -> Result<()> {
    client.send(legacy_revoke_request(endpoint, token)?).await?;
    Ok(())
}
