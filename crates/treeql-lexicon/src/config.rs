//! Endpoint configuration for label resolution.

use std::time::Duration;

use url::Url;

use crate::{LexiconError, Result};

pub const ENDPOINT_ENV: &str = "TREEQL_SPARQL_ENDPOINT";
pub const TIMEOUT_ENV: &str = "TREEQL_SPARQL_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "TREEQL_USER_AGENT";

pub const DEFAULT_ENDPOINT: &str = "http://dbpedia.org/sparql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the SPARQL endpoint used for label resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: Url,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl EndpointConfig {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            url: parse_endpoint(url)?,
            ..Self::default()
        })
    }

    /// Load from environment variables, falling back to the defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENDPOINT_ENV) {
            config.url = parse_endpoint(&url)?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                LexiconError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds, got `{raw}`"))
            })?;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV) {
            config.user_agent = agent;
        }
        Ok(config)
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| LexiconError::Config(format!("invalid endpoint url `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LexiconError::Config(format!(
            "endpoint url must be http(s), got scheme `{other}`"
        ))),
    }
}

fn default_user_agent() -> String {
    format!("treeql/{}", env!("CARGO_PKG_VERSION"))
}
