use bon::Builder;
use indieauth_common::UrlKind;
use url::Url;

use crate::error::Result;
use crate::pkce::{CODE_VERIFIER_LENGTH, STATE_LENGTH};

/// Client identity and generation parameters shared by every flow.
///
/// Construct with [`ClientConfig::new`]; `build()` checks `client_id` against
/// the client identifier rules and `redirect_uri` against the redirect rules.
///
/// ```
/// # use indieauth::config::ClientConfig;
/// # use url::Url;
/// let config = ClientConfig::new()
///     .client_id(Url::parse("https://app.example.com/").unwrap())
///     .redirect_uri(Url::parse("https://app.example.com/callback").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.state_length(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(start_fn = new, finish_fn(name = build_unchecked, vis = ""))]
pub struct ClientConfig {
    client_id: Url,
    redirect_uri: Url,
    /// Length of generated `state` values.
    #[builder(default = STATE_LENGTH)]
    state_length: usize,
    /// Length of generated code verifiers. Values outside `43..=128` select a
    /// random valid length per request.
    #[builder(default = CODE_VERIFIER_LENGTH)]
    code_verifier_length: usize,
}

impl<S: client_config_builder::IsComplete> ClientConfigBuilder<S> {
    /// Finish the config, validating both URLs.
    pub fn build(self) -> Result<ClientConfig> {
        let config = self.build_unchecked();
        UrlKind::ClientId.check(&config.client_id)?;
        UrlKind::RedirectUri.check(&config.redirect_uri)?;
        Ok(config)
    }
}

impl ClientConfig {
    /// The client identifier sent with every request.
    pub fn client_id(&self) -> &Url {
        &self.client_id
    }

    /// Where the authorization server returns the user.
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Length of generated `state` values.
    pub fn state_length(&self) -> usize {
        self.state_length
    }

    /// Length of generated PKCE code verifiers.
    pub fn code_verifier_length(&self) -> usize {
        self.code_verifier_length
    }
}

/// Parse `input` and check it against the rules for `kind`.
///
/// Rules that URL parsing would normalize away (explicit default ports, dot
/// segments) are evaluated against `input` as written.
pub fn ensure_conformance(input: &str, kind: UrlKind) -> Result<Url> {
    Ok(kind.parse(input)??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use indieauth_common::UrlRule;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn builds_with_defaults() {
        let config = ClientConfig::new()
            .client_id(url("https://app.example.com/"))
            .redirect_uri(url("https://app.example.com/callback"))
            .build()
            .unwrap();
        assert_eq!(config.state_length(), STATE_LENGTH);
        assert_eq!(config.code_verifier_length(), CODE_VERIFIER_LENGTH);
        assert_eq!(config.client_id().as_str(), "https://app.example.com/");
    }

    #[test]
    fn loopback_client_and_native_redirect() {
        let config = ClientConfig::new()
            .client_id(url("http://127.0.0.1:8000/"))
            .redirect_uri(url("com.example.app:/callback"))
            .code_verifier_length(64)
            .build()
            .unwrap();
        assert_eq!(config.code_verifier_length(), 64);
    }

    #[test]
    fn rejects_bad_client_id() {
        let err = ClientConfig::new()
            .client_id(url("https://app.example.com/#frag"))
            .redirect_uri(url("https://app.example.com/callback"))
            .build()
            .unwrap_err();
        match err {
            Error::UrlConformance(e) => {
                assert_eq!(e.kind, Some(UrlKind::ClientId));
                assert_eq!(e.rule, UrlRule::FragmentNotAllowed);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_redirect_with_fragment() {
        let err = ClientConfig::new()
            .client_id(url("https://app.example.com/"))
            .redirect_uri(url("https://app.example.com/callback#done"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UrlConformance(ref e) if e.kind == Some(UrlKind::RedirectUri)
        ));
    }

    #[test]
    fn ensure_conformance_reports_parse_and_rule_failures() {
        assert!(matches!(
            ensure_conformance("not a url", UrlKind::UserProfile),
            Err(Error::Url(_))
        ));
        assert!(matches!(
            ensure_conformance("https://example.com:443/", UrlKind::UserProfile),
            Err(Error::UrlConformance(ref e)) if e.rule == UrlRule::PortNotAllowed
        ));
        let url = ensure_conformance("https://example.com", UrlKind::UserProfile).unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }
}
