use indieauth_common::{HttpStatusError, ResponseError, TransportError, UrlConformanceError};
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors emitted by IndieAuth discovery, authorization and token operations.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The HTTP client failed before a response arrived
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status outside `200..=299`
    #[error(transparent)]
    #[diagnostic(transparent)]
    HttpStatus(#[from] HttpStatusError),

    /// A response body was not the JSON we expected
    #[error("failed to decode response from {url}")]
    #[diagnostic(
        code(indieauth::decode),
        help("the server returned malformed or unexpected JSON")
    )]
    Decode {
        /// Where the body came from
        url: SmolStr,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// A URL broke one of the IndieAuth URL rules
    #[error(transparent)]
    #[diagnostic(transparent)]
    UrlConformance(#[from] UrlConformanceError),

    /// Discovery found no usable endpoint links on the profile
    #[error("no IndieAuth metadata found for {url}")]
    #[diagnostic(
        code(indieauth::metadata_not_found),
        help(
            "the profile must link `indieauth-metadata`, or both `authorization_endpoint` and `token_endpoint`"
        )
    )]
    MetadataNotFound {
        /// The profile URL that was searched
        url: SmolStr,
    },

    /// The code verifier is outside the PKCE length or alphabet rules
    #[error("invalid code verifier")]
    #[diagnostic(
        code(indieauth::invalid_code_verifier),
        help("use 43 to 128 characters from [A-Za-z0-9-._~]")
    )]
    InvalidCodeVerifier,

    /// The request names a code challenge method this crate cannot compute
    #[error("unsupported code challenge method: {0}")]
    #[diagnostic(
        code(indieauth::unsupported_challenge_method),
        help("use `S256`, or `plain` when the server advertises nothing better")
    )]
    UnsupportedChallengeMethod(SmolStr),

    /// The server does not advertise an endpoint the operation needs
    #[error("no {0} endpoint available")]
    #[diagnostic(
        code(indieauth::no_endpoint),
        help("server does not advertise this endpoint")
    )]
    NoEndpoint(SmolStr),

    /// The authorization callback failed its state or issuer checks
    #[error("authorization callback rejected: {0}")]
    #[diagnostic(
        code(indieauth::callback),
        help("restart the authorization flow; the callback does not belong to the pending request")
    )]
    Callback(SmolStr),

    /// URL parse error
    #[error(transparent)]
    #[diagnostic(code(indieauth::url))]
    Url(#[from] url::ParseError),

    /// HTTP request construction failed
    #[error(transparent)]
    #[diagnostic(code(indieauth::http_build))]
    HttpBuild(#[from] http::Error),

    /// Form body encoding failed
    #[error(transparent)]
    #[diagnostic(code(indieauth::form_encode))]
    FormEncode(#[from] serde_html_form::ser::Error),
}

impl From<ResponseError> for Error {
    fn from(e: ResponseError) -> Self {
        match e {
            ResponseError::Transport(e) => Self::Transport(e),
            ResponseError::Status(e) => Self::HttpStatus(e),
        }
    }
}

impl Error {
    pub(crate) fn decode(url: impl AsRef<str>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.as_ref().into(),
            source,
        }
    }

    pub(crate) fn metadata_not_found(url: &url::Url) -> Self {
        Self::MetadataNotFound {
            url: url.as_str().into(),
        }
    }

    /// Link to the section of the IndieAuth specification that explains the
    /// failure, where there is one.
    pub fn reference_uri(&self) -> Option<&'static str> {
        match self {
            Error::UrlConformance(_) | Error::Url(_) => {
                Some("https://indieauth.spec.indieweb.org/#user-profile-url")
            }
            Error::InvalidCodeVerifier | Error::UnsupportedChallengeMethod(_) => {
                Some("https://indieauth.spec.indieweb.org/#authorization-request")
            }
            Error::MetadataNotFound { .. } => {
                Some("https://indieauth.spec.indieweb.org/#discovery-by-clients")
            }
            Error::Callback(_) => {
                Some("https://indieauth.spec.indieweb.org/#authorization-response")
            }
            _ => None,
        }
    }

    /// HTTP status of the failed response, if the failure was a status error.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Error::HttpStatus(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Result alias with [`Error`] as the error type.
pub type Result<T> = core::result::Result<T, Error>;
