//! Profile URL to authorization server discovery.
//!
//! A profile advertises its server either with a single
//! `rel="indieauth-metadata"` link to a JSON metadata document, or with the
//! older pair of `rel="authorization_endpoint"` and `rel="token_endpoint"`
//! links. Links are read from HTTP `Link` headers first and then from HTML
//! `<link>` elements, in document order.

use std::future::Future;

use http::header::LINK;
use indieauth_common::{HttpClient, HttpClientExt, ResponseUrl, UrlKind};
use scraper::{Html, Selector};
use smol_str::SmolStr;
use url::Url;

use crate::config::ensure_conformance;
use crate::error::{Error, Result};
use crate::types::{LegacyServerMetadata, ServerMetadata};

pub const REL_METADATA: &str = "indieauth-metadata";
pub const REL_AUTHORIZATION_ENDPOINT: &str = "authorization_endpoint";
pub const REL_TOKEN_ENDPOINT: &str = "token_endpoint";

/// A fetched profile page, reduced to its `rel` links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDocument {
    url: Url,
    base: Url,
    links: Vec<(SmolStr, Url)>,
}

impl ProfileDocument {
    /// Extract links from an HTML body. Relative `href`s resolve against
    /// `<base href>` if present, otherwise against `url`.
    pub fn parse(url: Url, html: &str) -> Self {
        let mut document = ProfileDocument {
            base: url.clone(),
            url,
            links: Vec::new(),
        };
        document.add_html_links(html);
        document
    }

    /// Extract links from a profile response: `Link` headers, then HTML.
    ///
    /// When the response carries a [`ResponseUrl`] (the client followed
    /// redirects), relative references resolve against that final URL.
    pub fn from_response(url: Url, response: &http::Response<Vec<u8>>) -> Self {
        let base = response
            .extensions()
            .get::<ResponseUrl>()
            .map_or_else(|| url.clone(), |served| served.0.clone());
        let mut document = ProfileDocument {
            url,
            base,
            links: Vec::new(),
        };
        for value in response.headers().get_all(LINK) {
            if let Ok(value) = value.to_str() {
                document.add_header_links(value);
            }
        }
        document.add_html_links(&String::from_utf8_lossy(response.body()));
        document
    }

    /// The profile URL this document was requested from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL the body was served from, after any redirects.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Every link carrying `rel`, in the order found. Matching is
    /// case-insensitive on each whitespace-separated rel token.
    pub fn links(&self, rel: &str) -> Vec<&Url> {
        self.links
            .iter()
            .filter(|(r, _)| r.eq_ignore_ascii_case(rel))
            .map(|(_, url)| url)
            .collect()
    }

    /// The first link carrying `rel`.
    pub fn link(&self, rel: &str) -> Option<&Url> {
        self.links
            .iter()
            .find(|(r, _)| r.eq_ignore_ascii_case(rel))
            .map(|(_, url)| url)
    }

    fn push(&mut self, rels: &str, base: &Url, href: &str) {
        let Ok(target) = base.join(href.trim()) else {
            return;
        };
        for rel in rels.split_ascii_whitespace() {
            self.links.push((rel.into(), target.clone()));
        }
    }

    fn add_header_links(&mut self, value: &str) {
        let base = self.base.clone();
        for (target, rels) in parse_link_header(value) {
            self.push(rels, &base, target);
        }
    }

    fn add_html_links(&mut self, html: &str) {
        let (Ok(links), Ok(bases)) = (
            Selector::parse("link[rel][href]"),
            Selector::parse("base[href]"),
        ) else {
            return;
        };
        let html = Html::parse_document(html);
        let base = html
            .select(&bases)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| self.base.join(href).ok())
            .unwrap_or_else(|| self.base.clone());
        for element in html.select(&links) {
            let el = element.value();
            if let (Some(rel), Some(href)) = (el.attr("rel"), el.attr("href")) {
                self.push(rel, &base, href);
            }
        }
    }
}

/// Turn what a user typed into a profile URL: `https://` is assumed when no
/// scheme is given, then the profile URL rules are enforced.
// https://indieauth.spec.indieweb.org/#url-canonicalization
pub fn canonicalize_profile_url(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.contains("://") {
        ensure_conformance(input, UrlKind::UserProfile)
    } else {
        ensure_conformance(&format!("https://{input}"), UrlKind::UserProfile)
    }
}

/// Split an RFC 8288 `Link` header value into `(target, rel)` pairs.
fn parse_link_header(value: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = value;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let target = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let mut in_quotes = false;
        let mut cut = rest.len();
        for (i, c) in rest.char_indices() {
            match c {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => {
                    cut = i;
                    break;
                }
                _ => {}
            }
        }
        let params = &rest[..cut];
        rest = &rest[cut..];

        for param in params.split(';') {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("rel") {
                    out.push((target, value.trim().trim_matches('"')));
                }
            }
        }
    }
    out
}

/// Outcome of [`IndieAuthResolver::discover_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveredServer {
    /// Found through `indieauth-metadata`
    Metadata(ServerMetadata),
    /// Found through the legacy endpoint links
    Legacy(LegacyServerMetadata),
}

impl DiscoveredServer {
    /// Where the user is sent to authorize.
    pub fn authorization_endpoint(&self) -> &Url {
        match self {
            DiscoveredServer::Metadata(m) => &m.authorization_endpoint,
            DiscoveredServer::Legacy(m) => &m.authorization_endpoint,
        }
    }

    /// Where codes are redeemed; legacy servers also verify and revoke here.
    pub fn token_endpoint(&self) -> &Url {
        match self {
            DiscoveredServer::Metadata(m) => &m.token_endpoint,
            DiscoveredServer::Legacy(m) => &m.token_endpoint,
        }
    }

    /// The issuer a callback must name. Legacy servers have none.
    pub fn issuer(&self) -> Option<&Url> {
        match self {
            DiscoveredServer::Metadata(m) => Some(&m.issuer),
            DiscoveredServer::Legacy(_) => None,
        }
    }

    /// Whether the server was found through the legacy links.
    pub fn is_legacy(&self) -> bool {
        matches!(self, DiscoveredServer::Legacy(_))
    }
}

impl LegacyServerMetadata {
    /// Read both legacy endpoint links from a document, without any fetch.
    pub fn from_document(document: &ProfileDocument) -> Result<Self> {
        match (
            document.link(REL_AUTHORIZATION_ENDPOINT),
            document.link(REL_TOKEN_ENDPOINT),
        ) {
            (Some(authorization_endpoint), Some(token_endpoint)) => Ok(LegacyServerMetadata {
                authorization_endpoint: authorization_endpoint.clone(),
                token_endpoint: token_endpoint.clone(),
            }),
            _ => Err(Error::metadata_not_found(document.url())),
        }
    }
}

/// Discovery operations for any [`HttpClient`].
pub trait IndieAuthResolver: HttpClient {
    /// Fetch a profile URL and extract its links.
    fn fetch_profile(
        &self,
        profile_url: &Url,
    ) -> impl Future<Output = Result<ProfileDocument>> + Send
    where
        Self: Sync,
    {
        fetch_profile_impl(self, profile_url)
    }

    /// Resolve the `indieauth-metadata` link of a profile and fetch the
    /// metadata it points to.
    fn discover(&self, profile_url: &Url) -> impl Future<Output = Result<ServerMetadata>> + Send
    where
        Self: Sync,
    {
        async move {
            let document = self.fetch_profile(profile_url).await?;
            discover_in_impl(self, &document).await
        }
    }

    /// Like [`discover`](Self::discover), against a document already fetched.
    fn discover_in(
        &self,
        document: &ProfileDocument,
    ) -> impl Future<Output = Result<ServerMetadata>> + Send
    where
        Self: Sync,
    {
        discover_in_impl(self, document)
    }

    /// Resolve the legacy `authorization_endpoint` and `token_endpoint`
    /// links of a profile.
    fn discover_legacy(
        &self,
        profile_url: &Url,
    ) -> impl Future<Output = Result<LegacyServerMetadata>> + Send
    where
        Self: Sync,
    {
        async move {
            let document = self.fetch_profile(profile_url).await?;
            LegacyServerMetadata::from_document(&document)
        }
    }

    /// Fetch the profile once, then try the metadata link and fall back to
    /// the legacy links when there is none.
    fn discover_server(
        &self,
        profile_url: &Url,
    ) -> impl Future<Output = Result<DiscoveredServer>> + Send
    where
        Self: Sync,
    {
        discover_server_impl(self, profile_url)
    }
}

impl<T: HttpClient + ?Sized> IndieAuthResolver for T {}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(profile = %profile_url))
)]
async fn fetch_profile_impl<T: HttpClient + Sync + ?Sized>(
    client: &T,
    profile_url: &Url,
) -> Result<ProfileDocument> {
    let response = client
        .fetch(
            profile_url,
            "text/html, application/xhtml+xml;q=0.9, */*;q=0.8",
        )
        .await?;
    Ok(ProfileDocument::from_response(profile_url.clone(), &response))
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(profile = %document.url()))
)]
async fn discover_in_impl<T: HttpClient + Sync + ?Sized>(
    client: &T,
    document: &ProfileDocument,
) -> Result<ServerMetadata> {
    let Some(metadata_url) = document.link(REL_METADATA) else {
        return Err(Error::metadata_not_found(document.url()));
    };
    let response = client.fetch(metadata_url, "application/json").await?;
    serde_json::from_slice(response.body()).map_err(|e| Error::decode(metadata_url, e))
}

async fn discover_server_impl<T: HttpClient + Sync + ?Sized>(
    client: &T,
    profile_url: &Url,
) -> Result<DiscoveredServer> {
    let document = fetch_profile_impl(client, profile_url).await?;
    if document.link(REL_METADATA).is_some() {
        return Ok(DiscoveredServer::Metadata(
            discover_in_impl(client, &document).await?,
        ));
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(profile = %profile_url, "no indieauth-metadata link, trying legacy endpoints");
    Ok(DiscoveredServer::Legacy(LegacyServerMetadata::from_document(
        &document,
    )?))
}
