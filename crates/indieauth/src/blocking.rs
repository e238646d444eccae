//! Synchronous wrapper over [`IndieAuthClient`].
//!
//! Each call drives the async operation to completion on a private
//! current-thread runtime. Do not use it from inside an async context.

use indieauth_common::HttpClient;
use url::Url;

use crate::client::{IndieAuthClient, PendingAuthorization};
use crate::discovery::DiscoveredServer;
use crate::error::Result;
use crate::types::{AuthorizationResponse, RedemptionResponse, VerificationResponse};

/// An [`IndieAuthClient`] whose network calls block the current thread.
pub struct BlockingClient<T> {
    inner: IndieAuthClient<T>,
    runtime: tokio::runtime::Runtime,
}

impl<T: HttpClient + Send + Sync> BlockingClient<T> {
    /// Wrap `inner`, starting the runtime that drives its calls.
    pub fn new(inner: IndieAuthClient<T>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { inner, runtime })
    }

    /// The wrapped async client.
    pub fn inner(&self) -> &IndieAuthClient<T> {
        &self.inner
    }

    /// See [`IndieAuthClient::discover`].
    pub fn discover(&self, profile: &str) -> Result<DiscoveredServer> {
        self.runtime.block_on(self.inner.discover(profile))
    }

    /// See [`IndieAuthClient::start_authorization`]; makes no network call.
    pub fn start_authorization(
        &self,
        server: &DiscoveredServer,
        scope: Option<&str>,
        me: Option<&Url>,
    ) -> Result<PendingAuthorization> {
        self.inner.start_authorization(server, scope, me)
    }

    /// See [`IndieAuthClient::finish_callback`]; makes no network call.
    pub fn finish_callback(
        &self,
        pending: &PendingAuthorization,
        callback: &Url,
    ) -> Result<AuthorizationResponse> {
        self.inner.finish_callback(pending, callback)
    }

    /// See [`IndieAuthClient::redeem`].
    pub fn redeem(
        &self,
        pending: &PendingAuthorization,
        response: &AuthorizationResponse,
    ) -> Result<RedemptionResponse> {
        self.runtime.block_on(self.inner.redeem(pending, response))
    }

    /// See [`IndieAuthClient::refresh`].
    pub fn refresh(
        &self,
        server: &DiscoveredServer,
        refresh_token: &str,
        scope: Option<&str>,
    ) -> Result<RedemptionResponse> {
        self.runtime
            .block_on(self.inner.refresh(server, refresh_token, scope))
    }

    /// See [`IndieAuthClient::verify`].
    pub fn verify(&self, server: &DiscoveredServer, token: &str) -> Result<VerificationResponse> {
        self.runtime.block_on(self.inner.verify(server, token))
    }

    /// See [`IndieAuthClient::revoke`].
    pub fn revoke(&self, server: &DiscoveredServer, token: &str) -> Result<()> {
        self.runtime.block_on(self.inner.revoke(server, token))
    }
}
