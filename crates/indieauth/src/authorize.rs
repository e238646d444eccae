use url::Url;

use crate::error::Result;
use crate::types::AuthorizationRequest;

/// Build the URL to send the user to.
///
/// Query parameters already present on `endpoint` are kept; the request
/// parameters are appended after them.
// https://indieauth.spec.indieweb.org/#authorization-request
pub fn authorize_request_url(endpoint: &Url, request: &AuthorizationRequest) -> Result<Url> {
    let challenge = request.code_challenge()?;
    let mut url = endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", request.response_type.as_str())
            .append_pair("client_id", request.client_id.as_str())
            .append_pair("redirect_uri", request.redirect_uri.as_str())
            .append_pair("state", &request.state)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", request.code_challenge_method.as_str());
        if let Some(scope) = &request.scope {
            query.append_pair("scope", scope);
        }
        if let Some(me) = &request.me {
            query.append_pair("me", me.as_str());
        }
    }
    Ok(url)
}
