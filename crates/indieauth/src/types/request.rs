use bon::Builder;
use serde::Serialize;
use smol_str::SmolStr;
use url::Url;

use super::{CodeChallengeMethod, GrantType, ResponseType, ServerMetadata};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::pkce;

/// Everything needed to send the user to an authorization endpoint.
///
/// The caller must keep `state` and `code_verifier` until the callback
/// arrives. The code challenge is derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new)]
pub struct AuthorizationRequest {
    #[builder(default)]
    pub response_type: ResponseType,
    pub client_id: Url,
    pub redirect_uri: Url,
    #[builder(into, default = pkce::generate_state(pkce::STATE_LENGTH))]
    pub state: SmolStr,
    #[builder(into, default = pkce::generate_code_verifier(Some(pkce::CODE_VERIFIER_LENGTH)))]
    pub code_verifier: SmolStr,
    #[builder(default = CodeChallengeMethod::S256)]
    pub code_challenge_method: CodeChallengeMethod,
    #[builder(into)]
    pub scope: Option<SmolStr>,
    pub me: Option<Url>,
}

impl AuthorizationRequest {
    /// A request tailored to what the server advertises: its first response
    /// type (or `code`), and `S256` when supported, `plain` otherwise.
    pub fn from_metadata(metadata: &ServerMetadata, config: &ClientConfig) -> Self {
        AuthorizationRequest {
            response_type: metadata
                .response_types_supported
                .first()
                .cloned()
                .unwrap_or_default(),
            client_id: config.client_id().clone(),
            redirect_uri: config.redirect_uri().clone(),
            state: pkce::generate_state(config.state_length()),
            code_verifier: pkce::generate_code_verifier(Some(config.code_verifier_length())),
            code_challenge_method: metadata.preferred_challenge_method(),
            scope: None,
            me: None,
        }
    }

    /// A request for a server found through legacy `<link>` discovery, which
    /// publishes no capabilities.
    ///
    /// Uses `S256` even though nothing is advertised: servers that predate
    /// PKCE ignore the challenge, and every PKCE-aware one accepts `S256`.
    pub fn from_config(config: &ClientConfig) -> Self {
        AuthorizationRequest {
            response_type: ResponseType::Code,
            client_id: config.client_id().clone(),
            redirect_uri: config.redirect_uri().clone(),
            state: pkce::generate_state(config.state_length()),
            code_verifier: pkce::generate_code_verifier(Some(config.code_verifier_length())),
            code_challenge_method: CodeChallengeMethod::S256,
            scope: None,
            me: None,
        }
    }

    /// Request `scope`, a space-separated list.
    pub fn with_scope(mut self, scope: impl Into<SmolStr>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Hint the profile URL the user entered.
    pub fn with_me(mut self, me: Url) -> Self {
        self.me = Some(me);
        self
    }

    /// The challenge for `code_verifier` under `code_challenge_method`.
    pub fn code_challenge(&self) -> Result<SmolStr> {
        pkce::code_challenge(&self.code_verifier, &self.code_challenge_method)
    }

    /// The matching code exchange for the `code` the callback delivered.
    pub fn redemption(&self, code: impl Into<SmolStr>) -> RedemptionRequest {
        RedemptionRequest {
            grant_type: GrantType::AuthorizationCode,
            code: code.into(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            code_verifier: Some(self.code_verifier.clone()),
        }
    }
}

/// Form body exchanging an authorization code at the token endpoint.
// https://indieauth.spec.indieweb.org/#redeeming-the-authorization-code
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRequest {
    pub grant_type: GrantType,
    pub code: SmolStr,
    pub client_id: Url,
    pub redirect_uri: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<SmolStr>,
}

impl RedemptionRequest {
    /// A code exchange without PKCE, for codes issued to a request that
    /// sent no challenge.
    pub fn new(code: impl Into<SmolStr>, config: &ClientConfig) -> Self {
        RedemptionRequest {
            grant_type: GrantType::AuthorizationCode,
            code: code.into(),
            client_id: config.client_id().clone(),
            redirect_uri: config.redirect_uri().clone(),
            code_verifier: None,
        }
    }

    /// Attach the verifier whose challenge accompanied the authorization
    /// request.
    pub fn with_code_verifier(mut self, verifier: impl Into<SmolStr>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }
}

/// Form body trading a refresh token for a new access token.
// https://indieauth.spec.indieweb.org/#refresh-tokens
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRequest {
    pub grant_type: GrantType,
    pub refresh_token: SmolStr,
    pub client_id: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SmolStr>,
}

impl RefreshTokenRequest {
    pub fn new(refresh_token: impl Into<SmolStr>, client_id: &Url) -> Self {
        RefreshTokenRequest {
            grant_type: GrantType::RefreshToken,
            refresh_token: refresh_token.into(),
            client_id: client_id.as_str().into(),
            scope: None,
        }
    }

    /// Ask for a narrower scope than the original grant.
    /// Request `scope`, a space-separated list.
    pub fn with_scope(mut self, scope: impl Into<SmolStr>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// `token=...` body used by introspection and revocation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest<'a> {
    pub token: &'a str,
}

/// `action=revoke&token=...` body of the legacy token endpoint.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LegacyRevocationRequest<'a> {
    pub action: &'static str,
    pub token: &'a str,
}

impl<'a> LegacyRevocationRequest<'a> {
    pub fn new(token: &'a str) -> Self {
        LegacyRevocationRequest {
            action: "revoke",
            token,
        }
    }
}
