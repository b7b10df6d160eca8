//! Provider configuration: credentials, endpoint and HTTP timeout

use std::time::Duration;

use alicheck_core::provider::{ProviderError, ProviderResult};

/// Environment variable holding the AccessKey ID
pub const ACCESS_KEY_ENV: &str = "ALICLOUD_ACCESS_KEY";
/// Environment variable holding the AccessKey secret
pub const SECRET_KEY_ENV: &str = "ALICLOUD_SECRET_KEY";
/// Environment variable holding an STS security token (optional)
pub const SECURITY_TOKEN_ENV: &str = "ALICLOUD_SECURITY_TOKEN";
/// Environment variable overriding the ECS endpoint (optional)
pub const ENDPOINT_ENV: &str = "ALICLOUD_ECS_ENDPOINT";

/// Connection settings for the ECS API
#[derive(Clone)]
pub struct AliCloudConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub security_token: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl AliCloudConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://ecs.aliyuncs.com";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            security_token: None,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Build configuration from the process environment
    pub fn from_env() -> ProviderResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ProviderResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_key_id = non_empty(ACCESS_KEY_ENV).ok_or_else(|| {
            ProviderError::configuration(format!("{} is not set", ACCESS_KEY_ENV))
        })?;
        let access_key_secret = non_empty(SECRET_KEY_ENV).ok_or_else(|| {
            ProviderError::configuration(format!("{} is not set", SECRET_KEY_ENV))
        })?;

        let mut config = Self::new(access_key_id, access_key_secret);
        config.security_token = non_empty(SECURITY_TOKEN_ENV);
        if let Some(endpoint) = non_empty(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the secret out of debug output
impl std::fmt::Debug for AliCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliCloudConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("security_token", &self.security_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}
