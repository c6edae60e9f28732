//! Client configuration, built in code or read from the environment.

use std::{env, time::Duration};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::error::ClientError;

pub const API_KEY_VAR: &str = "IOCLISTS_API_KEY";
pub const BASE_URL_VAR: &str = "IOCLISTS_BASE_URL";
pub const USER_AGENT_VAR: &str = "IOCLISTS_USER_AGENT";
pub const TIMEOUT_SECS_VAR: &str = "IOCLISTS_TIMEOUT_SECS";

/// Static settings shared by every request a client sends.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    user_agent: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }

    /// Parse configuration from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ClientError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api_key = optional_trimmed(API_KEY_VAR, &mut lookup).ok_or_else(|| {
            ClientError::invalid_argument("api_key", format!("{API_KEY_VAR} is not set"))
        })?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = optional_trimmed(BASE_URL_VAR, &mut lookup) {
            config = config.with_base_url(base_url);
        }
        if let Some(user_agent) = optional_trimmed(USER_AGENT_VAR, &mut lookup) {
            config = config.with_user_agent(user_agent);
        }
        if let Some(raw) = optional_trimmed(TIMEOUT_SECS_VAR, &mut lookup) {
            let secs: u64 = raw.parse().map_err(|_| {
                ClientError::invalid_argument(
                    "timeout",
                    format!("{TIMEOUT_SECS_VAR} must be a whole number of seconds, got {raw:?}"),
                )
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Service root. A trailing `/` is added when missing so relative paths
    /// join below it.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::invalid_argument("api_key", "API key is empty"));
        }
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

fn optional_trimmed<F>(key: &str, lookup: &mut F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
