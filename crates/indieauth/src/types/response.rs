use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use crate::error::{Error, Result};

/// Parameters delivered to the redirect URI after the user approves.
// https://indieauth.spec.indieweb.org/#authorization-response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: SmolStr,
    pub state: SmolStr,
    pub iss: Option<SmolStr>,
}

fn query_param(url: &Url, name: &str) -> Option<SmolStr> {
    url.query_pairs()
        .find(|(key, _)| &**key == name)
        .map(|(_, value)| SmolStr::new(value))
}

impl AuthorizationResponse {
    /// Parse a callback URL. `None` unless `code`, `state` and `iss` are all
    /// present.
    pub fn from_callback(callback: &Url) -> Option<Self> {
        Some(AuthorizationResponse {
            code: query_param(callback, "code")?,
            state: query_param(callback, "state")?,
            iss: Some(query_param(callback, "iss")?),
        })
    }

    /// Parse a callback from a legacy server, which does not send `iss`.
    pub fn from_legacy_callback(callback: &Url) -> Option<Self> {
        Some(AuthorizationResponse {
            code: query_param(callback, "code")?,
            state: query_param(callback, "state")?,
            iss: query_param(callback, "iss"),
        })
    }

    /// Check that the callback answers the request we sent. `state` must
    /// match exactly; when `expected_issuer` is given, so must `iss`.
    pub fn check(&self, expected_state: &str, expected_issuer: Option<&Url>) -> Result<()> {
        if self.state != expected_state {
            return Err(Error::Callback("state does not match".into()));
        }
        if let Some(issuer) = expected_issuer {
            match &self.iss {
                Some(iss) if iss == issuer.as_str() => {}
                Some(_) => return Err(Error::Callback("issuer does not match".into())),
                None => return Err(Error::Callback("missing `iss` parameter".into())),
            }
        }
        Ok(())
    }
}

/// `error` parameters an authorization server puts on the redirect when the
/// request was denied or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationErrorResponse {
    pub error: SmolStr,
    pub error_description: Option<SmolStr>,
    pub state: Option<SmolStr>,
}

impl AuthorizationErrorResponse {
    pub fn from_callback(callback: &Url) -> Option<Self> {
        Some(AuthorizationErrorResponse {
            error: query_param(callback, "error")?,
            error_description: query_param(callback, "error_description"),
            state: query_param(callback, "state"),
        })
    }
}

/// Profile information returned with the `profile` scope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: SmolStr,
    pub url: Url,
    pub photo: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<SmolStr>,
}

/// Token endpoint answer to a code redemption or refresh.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedemptionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<SmolStr>,
    pub me: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<SmolStr>,
}

impl RedemptionResponse {
    /// When the access token expires, counting from `received_at`.
    pub fn expires_at(&self, received_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(self.expires_in?)?;
        received_at.checked_add_signed(lifetime)
    }
}

/// Token introspection result.
// https://indieauth.spec.indieweb.org/#access-token-verification-response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationResponse {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl VerificationResponse {
    /// The answer for a token the server does not accept.
    pub fn inactive() -> Self {
        VerificationResponse {
            active: false,
            me: None,
            client_id: None,
            scope: None,
            exp: None,
            iat: None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp?, 0)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat?, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn callback_round_trip() {
        let callback = url(
            "https://app.example.com/callback?code=xyz&state=abc123&iss=https%3A%2F%2Fauth.example.com%2F",
        );
        let response = AuthorizationResponse::from_callback(&callback).unwrap();
        assert_eq!(response.code, "xyz");
        assert_eq!(response.state, "abc123");
        assert_eq!(response.iss.as_deref(), Some("https://auth.example.com/"));
    }

    #[test]
    fn callback_missing_any_parameter() {
        for query in ["code=x&state=s", "code=x&iss=i", "state=s&iss=i", ""] {
            let callback = url(&format!("https://app.example.com/callback?{query}"));
            assert!(AuthorizationResponse::from_callback(&callback).is_none(), "{query}");
        }
        let legacy = AuthorizationResponse::from_legacy_callback(&url(
            "https://app.example.com/callback?code=x&state=s",
        ))
        .unwrap();
        assert!(legacy.iss.is_none());
    }

    #[test]
    fn callback_checks() {
        let issuer = url("https://auth.example.com/");
        let response = AuthorizationResponse {
            code: "x".into(),
            state: "s".into(),
            iss: Some("https://auth.example.com/".into()),
        };
        assert!(response.check("s", Some(&issuer)).is_ok());
        assert!(matches!(response.check("t", Some(&issuer)), Err(Error::Callback(_))));
        assert!(matches!(
            response.check("s", Some(&url("https://evil.example.com/"))),
            Err(Error::Callback(_))
        ));

        let legacy = AuthorizationResponse { iss: None, ..response };
        assert!(legacy.check("s", None).is_ok());
        assert!(legacy.check("s", Some(&issuer)).is_err());
    }

    #[test]
    fn error_callback() {
        let callback = url(
            "https://app.example.com/callback?error=access_denied&error_description=User+said+no&state=s",
        );
        let err = AuthorizationErrorResponse::from_callback(&callback).unwrap();
        assert_eq!(err.error, "access_denied");
        assert_eq!(err.error_description.as_deref(), Some("User said no"));
        assert!(AuthorizationResponse::from_callback(&callback).is_none());
    }

    #[test]
    fn redemption_response_with_profile() {
        let response: RedemptionResponse = serde_json::from_value(serde_json::json!({
            "access_token": "XXXXXX",
            "token_type": "Bearer",
            "scope": "create update delete",
            "me": "https://user.example.net/",
            "expires_in": 3600,
            "profile": {
                "name": "Example User",
                "url": "https://user.example.net/",
                "photo": "https://user.example.net/photo.jpg",
                "email": "user@example.net"
            }
        }))
        .unwrap();
        assert_eq!(response.access_token.as_deref(), Some("XXXXXX"));
        let profile = response.profile.as_ref().unwrap();
        assert_eq!(profile.email.as_deref(), Some("user@example.net"));

        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            response.expires_at(now),
            DateTime::from_timestamp(1_700_003_600, 0)
        );
    }

    #[test]
    fn profile_only_redemption() {
        let response: RedemptionResponse =
            serde_json::from_str(r#"{"me":"https://user.example.net/"}"#).unwrap();
        assert!(response.access_token.is_none());
        assert!(response.expires_at(Utc::now()).is_none());
        assert!(serde_json::from_str::<RedemptionResponse>(r#"{"access_token":"x"}"#).is_err());
    }

    #[test]
    fn verification_response() {
        let response: VerificationResponse = serde_json::from_value(serde_json::json!({
            "active": true,
            "me": "https://user.example.net/",
            "client_id": "https://app.example.com/",
            "scope": "create update delete",
            "exp": 1632443647,
            "iat": 1632443147
        }))
        .unwrap();
        assert!(response.active);
        assert_eq!(response.expires_at(), DateTime::from_timestamp(1632443647, 0));
        assert_eq!(response.issued_at(), DateTime::from_timestamp(1632443147, 0));

        let inactive: VerificationResponse =
            serde_json::from_str(r#"{"active":false}"#).unwrap();
        assert_eq!(inactive, VerificationResponse::inactive());
    }
}
