//! Blocking HTTP client for the armory. One GET per call, no retries.

use super::error::FetchError;
use std::time::Duration;

/// The armory serves XML only to browser-looking clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; U; Linux x86_64; en-US; rv:1.9.1.8) Gecko/20101337 Gentoo Firefox/3.5.8";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of response bodies. Implemented by [ArmoryClient]; drivers are generic over it.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking armory client with a fixed User-Agent and optional timeout.
#[derive(Debug)]
pub struct ArmoryClient {
    inner: reqwest::blocking::Client,
}

impl ArmoryClient {
    /// Client with the default User-Agent and timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    pub fn builder() -> ArmoryClientBuilder {
        ArmoryClientBuilder::default()
    }
}

impl Fetch for ArmoryClient {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url, "GET");
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        tracing::debug!(url, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().map_err(|e| FetchError::BodyRead {
            url: url.to_string(),
            source: e,
        })?;
        Ok(body.to_vec())
    }
}

/// Builder for [ArmoryClient] with optional User-Agent and timeout.
#[derive(Debug)]
pub struct ArmoryClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for ArmoryClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ArmoryClientBuilder {
    /// Set a custom User-Agent. If not set, [DEFAULT_USER_AGENT] is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Request timeout in seconds. 0 disables the timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<ArmoryClient, FetchError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(ArmoryClient { inner })
    }
}
