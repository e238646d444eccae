use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use super::{CodeChallengeMethod, GrantType, ResponseType, TokenAuthMethod};

/// Authorization server metadata, as published at the `indieauth-metadata`
/// link of a profile.
// https://indieauth.spec.indieweb.org/#indieauth-server-metadata
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerMetadata {
    /// Issuer identifier; callbacks must echo it as `iss`.
    pub issuer: Url,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    /// Token verification endpoint (RFC 7662).
    pub introspection_endpoint: Url,
    #[serde(default)]
    pub introspection_endpoint_auth_methods_supported: Vec<TokenAuthMethod>,
    /// Token revocation endpoint (RFC 7009), if the server offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<Url>,
    /// Defaults to `none`.
    #[serde(default = "default_revocation_auth_methods")]
    pub revocation_endpoint_auth_methods_supported: Vec<TokenAuthMethod>,
    #[serde(default)]
    pub scopes_supported: Vec<SmolStr>,
    /// Defaults to `code`.
    #[serde(default = "default_response_types")]
    pub response_types_supported: Vec<ResponseType>,
    /// Defaults to `authorization_code`.
    #[serde(default = "default_grant_types")]
    pub grant_types_supported: Vec<GrantType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_documentation: Option<Url>,
    /// Empty means the server did not say; treat it as `plain` only.
    #[serde(default)]
    pub code_challenge_methods_supported: Vec<CodeChallengeMethod>,
    // https://datatracker.ietf.org/doc/html/rfc9207#section-3
    #[serde(default)]
    pub authorization_response_iss_parameter_supported: bool,
    /// Where a token with the `profile` scope fetches profile information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<Url>,
}

fn default_revocation_auth_methods() -> Vec<TokenAuthMethod> {
    vec![TokenAuthMethod::None]
}

fn default_response_types() -> Vec<ResponseType> {
    vec![ResponseType::Code]
}

fn default_grant_types() -> Vec<GrantType> {
    vec![GrantType::AuthorizationCode]
}

impl ServerMetadata {
    /// The strongest PKCE method the server advertises.
    pub fn preferred_challenge_method(&self) -> CodeChallengeMethod {
        if self
            .code_challenge_methods_supported
            .contains(&CodeChallengeMethod::S256)
        {
            CodeChallengeMethod::S256
        } else {
            CodeChallengeMethod::Plain
        }
    }
}

/// Endpoints found through the pre-metadata `<link>` tags.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LegacyServerMetadata {
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_metadata_takes_defaults() {
        let metadata: ServerMetadata = serde_json::from_value(serde_json::json!({
            "issuer": "https://auth.example.com/",
            "authorization_endpoint": "https://auth.example.com/auth",
            "token_endpoint": "https://auth.example.com/token",
            "introspection_endpoint": "https://auth.example.com/introspect",
        }))
        .unwrap();
        assert_eq!(metadata.response_types_supported, vec![ResponseType::Code]);
        assert_eq!(
            metadata.grant_types_supported,
            vec![GrantType::AuthorizationCode]
        );
        assert_eq!(
            metadata.revocation_endpoint_auth_methods_supported,
            vec![TokenAuthMethod::None]
        );
        assert!(metadata.introspection_endpoint_auth_methods_supported.is_empty());
        assert!(metadata.scopes_supported.is_empty());
        assert!(metadata.code_challenge_methods_supported.is_empty());
        assert!(!metadata.authorization_response_iss_parameter_supported);
        assert!(metadata.revocation_endpoint.is_none());
        assert_eq!(
            metadata.preferred_challenge_method(),
            CodeChallengeMethod::Plain
        );
    }

    #[test]
    fn full_metadata() {
        let metadata: ServerMetadata = serde_json::from_value(serde_json::json!({
            "issuer": "https://auth.example.com/",
            "authorization_endpoint": "https://auth.example.com/auth",
            "token_endpoint": "https://auth.example.com/token",
            "introspection_endpoint": "https://auth.example.com/introspect",
            "introspection_endpoint_auth_methods_supported": ["client_secret_basic"],
            "revocation_endpoint": "https://auth.example.com/revoke",
            "revocation_endpoint_auth_methods_supported": ["none"],
            "scopes_supported": ["profile", "email", "create"],
            "response_types_supported": ["code"],
            "grant_types_supported": ["authorization_code", "refresh_token"],
            "service_documentation": "https://indieauth.spec.indieweb.org",
            "code_challenge_methods_supported": ["plain", "S256"],
            "authorization_response_iss_parameter_supported": true,
            "userinfo_endpoint": "https://auth.example.com/userinfo",
        }))
        .unwrap();
        assert_eq!(
            metadata.introspection_endpoint_auth_methods_supported,
            vec![TokenAuthMethod::ClientSecretBasic]
        );
        assert_eq!(metadata.scopes_supported.len(), 3);
        assert!(
            metadata
                .grant_types_supported
                .contains(&GrantType::RefreshToken)
        );
        assert_eq!(metadata.preferred_challenge_method(), CodeChallengeMethod::S256);
        assert!(metadata.authorization_response_iss_parameter_supported);
        assert_eq!(
            metadata.userinfo_endpoint.as_ref().map(Url::as_str),
            Some("https://auth.example.com/userinfo")
        );
    }

    #[test]
    fn missing_required_endpoint_fails() {
        let result = serde_json::from_value::<ServerMetadata>(serde_json::json!({
            "issuer": "https://auth.example.com/",
            "authorization_endpoint": "https://auth.example.com/auth",
        }));
        assert!(result.is_err());
    }
}
