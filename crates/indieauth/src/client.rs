use std::sync::Arc;

use indieauth_common::HttpClient;
use smol_str::SmolStr;
use url::Url;

use crate::authorize::authorize_request_url;
use crate::config::ClientConfig;
use crate::discovery::{DiscoveredServer, IndieAuthResolver, canonicalize_profile_url};
use crate::error::{Error, Result};
use crate::pkce::validate_code_verifier;
use crate::request;
use crate::types::{
    AuthorizationErrorResponse, AuthorizationRequest, AuthorizationResponse, RedemptionResponse,
    RefreshTokenRequest, VerificationResponse,
};

/// An authorization in flight: what to send the user to, and what must be
/// kept until the callback comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub request: AuthorizationRequest,
    /// Where to redirect the user
    pub url: Url,
    pub token_endpoint: Url,
    /// Issuer the callback must name; `None` for legacy servers
    pub issuer: Option<Url>,
}

/// High-level IndieAuth client.
///
/// Bundles the client configuration with a shared HTTP client and picks the
/// modern or legacy variant of each operation from the [`DiscoveredServer`].
pub struct IndieAuthClient<T> {
    http: Arc<T>,
    config: Arc<ClientConfig>,
}

impl<T> Clone for IndieAuthClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
        }
    }
}

#[cfg(feature = "reqwest-client")]
impl IndieAuthClient<reqwest::Client> {
    /// A client backed by a default `reqwest::Client`.
    pub fn with_default_http(config: ClientConfig) -> Self {
        Self::new(reqwest::Client::new(), config)
    }
}

impl<T: HttpClient + Send + Sync> IndieAuthClient<T> {
    pub fn new(http: T, config: ClientConfig) -> Self {
        Self::from_arc(Arc::new(http), config)
    }

    pub fn from_arc(http: Arc<T>, config: ClientConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &Arc<T> {
        &self.http
    }

    /// Canonicalize what the user typed and discover their server.
    pub async fn discover(&self, profile: &str) -> Result<DiscoveredServer> {
        let profile_url = canonicalize_profile_url(profile)?;
        self.http.discover_server(&profile_url).await
    }

    /// Build the authorization request and redirect URL for `server`.
    pub fn start_authorization(
        &self,
        server: &DiscoveredServer,
        scope: Option<&str>,
        me: Option<&Url>,
    ) -> Result<PendingAuthorization> {
        let mut request = match server {
            DiscoveredServer::Metadata(metadata) => {
                AuthorizationRequest::from_metadata(metadata, &self.config)
            }
            DiscoveredServer::Legacy(_) => AuthorizationRequest::from_config(&self.config),
        };
        request.scope = scope.map(SmolStr::new);
        request.me = me.cloned();
        let url = authorize_request_url(server.authorization_endpoint(), &request)?;
        Ok(PendingAuthorization {
            request,
            url,
            token_endpoint: server.token_endpoint().clone(),
            issuer: server.issuer().cloned(),
        })
    }

    /// Parse and check the callback for `pending`. Error redirects from the
    /// server surface as [`Error::Callback`].
    pub fn finish_callback(
        &self,
        pending: &PendingAuthorization,
        callback: &Url,
    ) -> Result<AuthorizationResponse> {
        if let Some(err) = AuthorizationErrorResponse::from_callback(callback) {
            let message = match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error.to_string(),
            };
            return Err(Error::Callback(message.into()));
        }
        let response = match pending.issuer {
            Some(_) => AuthorizationResponse::from_callback(callback),
            None => AuthorizationResponse::from_legacy_callback(callback),
        }
        .ok_or_else(|| Error::Callback("missing `code`, `state` or `iss` parameter".into()))?;
        response.check(&pending.request.state, pending.issuer.as_ref())?;
        Ok(response)
    }

    /// Exchange the callback's code for tokens.
    pub async fn redeem(
        &self,
        pending: &PendingAuthorization,
        response: &AuthorizationResponse,
    ) -> Result<RedemptionResponse> {
        validate_code_verifier(&pending.request.code_verifier)?;
        let redemption = pending.request.redemption(response.code.clone());
        request::redeem(&*self.http, &pending.token_endpoint, &redemption).await
    }

    pub async fn refresh(
        &self,
        server: &DiscoveredServer,
        refresh_token: &str,
        scope: Option<&str>,
    ) -> Result<RedemptionResponse> {
        let mut refresh = RefreshTokenRequest::new(refresh_token, self.config.client_id());
        if let Some(scope) = scope {
            refresh = refresh.with_scope(scope);
        }
        request::refresh(&*self.http, server.token_endpoint(), &refresh).await
    }

    /// Introspect a token; legacy servers are asked at their token endpoint.
    pub async fn verify(
        &self,
        server: &DiscoveredServer,
        token: &str,
    ) -> Result<VerificationResponse> {
        match server {
            DiscoveredServer::Metadata(metadata) => {
                request::verify(&*self.http, &metadata.introspection_endpoint, token).await
            }
            DiscoveredServer::Legacy(legacy) => {
                request::legacy_verify(&*self.http, &legacy.token_endpoint, token).await
            }
        }
    }

    pub async fn revoke(&self, server: &DiscoveredServer, token: &str) -> Result<()> {
        match server {
            DiscoveredServer::Metadata(metadata) => {
                let Some(endpoint) = &metadata.revocation_endpoint else {
                    return Err(Error::NoEndpoint("revocation".into()));
                };
                request::revoke(&*self.http, endpoint, token).await
            }
            DiscoveredServer::Legacy(legacy) => {
                request::legacy_revoke(&*self.http, &legacy.token_endpoint, token).await
            }
        }
    }
}
