//! alicheck AliCloud Provider
//!
//! Looks up ECS security groups through the RPC-style ECS API.
//!
//! ## Module Structure
//!
//! - `config` - Credentials, endpoint and timeout
//! - `rpc` - Request signing
//! - `response` - Response bodies and error code mapping

pub mod config;
pub mod response;
pub mod rpc;

pub use config::AliCloudConfig;

use alicheck_core::provider::{BoxFuture, ProviderError, ProviderResult, SecurityGroupProvider};
use alicheck_core::resource::SecurityGroup;
use chrono::Utc;
use log::debug;
use reqwest::Client;

use crate::response::parse_describe_response;
use crate::rpc::RpcRequest;

const DESCRIBE_SECURITY_GROUP_ATTRIBUTE: &str = "DescribeSecurityGroupAttribute";

/// AliCloud Provider
pub struct AliCloudProvider {
    http: Client,
    config: AliCloudConfig,
}

impl AliCloudProvider {
    /// Create a new AliCloud Provider
    pub fn new(config: AliCloudConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self::with_client(http, config))
    }

    /// Create a provider from `ALICLOUD_*` environment variables
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(AliCloudConfig::from_env()?)
    }

    /// Create with a specific HTTP client (for testing)
    pub fn with_client(http: Client, config: AliCloudConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &AliCloudConfig {
        &self.config
    }

    /// Full signed URL for a request, with a fresh nonce and timestamp
    fn signed_url(&self, request: &RpcRequest) -> ProviderResult<String> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let query = request.signed_query(&self.config, &nonce, &timestamp)?;
        Ok(format!(
            "{}/?{}",
            self.config.endpoint.trim_end_matches('/'),
            query
        ))
    }

    // ========== ECS Security Group Operations ==========

    /// Describe a security group and its permissions
    async fn describe_ecs_security_group(
        &self,
        region: &str,
        group_id: &str,
    ) -> ProviderResult<SecurityGroup> {
        let request = RpcRequest::new(DESCRIBE_SECURITY_GROUP_ATTRIBUTE)
            .param("RegionId", region)
            .param("SecurityGroupId", group_id);
        let url = self.signed_url(&request)?;

        debug!(
            "{} {} in {} via {}",
            request.action(),
            group_id,
            region,
            self.config.endpoint
        );

        let response = self.http.get(&url).send().await.map_err(|e| {
            ProviderError::Transport(format!("{} request failed: {}", request.action(), e))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            ProviderError::Transport(format!("Failed to read {} response: {}", request.action(), e))
        })?;

        debug!("{} returned HTTP {}", request.action(), status);

        parse_describe_response(status, &body, region, group_id)
    }
}

impl SecurityGroupProvider for AliCloudProvider {
    fn name(&self) -> &'static str {
        "alicloud"
    }

    fn describe_security_group(
        &self,
        region: &str,
        group_id: &str,
    ) -> BoxFuture<'_, ProviderResult<SecurityGroup>> {
        let region = region.to_string();
        let group_id = group_id.to_string();
        Box::pin(async move { self.describe_ecs_security_group(&region, &group_id).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: &str) -> AliCloudProvider {
        AliCloudProvider::with_client(
            Client::new(),
            AliCloudConfig::new("testid", "testsecret").with_endpoint(endpoint),
        )
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider("https://ecs.aliyuncs.com").name(), "alicloud");
    }

    #[test]
    fn signed_url_targets_endpoint() {
        let provider = provider("https://ecs.eu-west-1.aliyuncs.com/");
        let request = RpcRequest::new(DESCRIBE_SECURITY_GROUP_ATTRIBUTE)
            .param("RegionId", "eu-west-1")
            .param("SecurityGroupId", "sg-123");
        let url = provider.signed_url(&request).unwrap();

        assert!(url.starts_with("https://ecs.eu-west-1.aliyuncs.com/?AccessKeyId=testid&"));
        assert!(url.contains("&Action=DescribeSecurityGroupAttribute&"));
        assert!(url.contains("&SecurityGroupId=sg-123&"));
        assert!(url.contains("&Signature="));
    }

    #[test]
    fn new_applies_configured_timeout() {
        let config = AliCloudConfig::new("testid", "testsecret")
            .with_timeout(std::time::Duration::from_secs(5));
        let provider = AliCloudProvider::new(config).unwrap();
        assert_eq!(provider.config().timeout, std::time::Duration::from_secs(5));
        assert_eq!(provider.config().endpoint, AliCloudConfig::DEFAULT_ENDPOINT);
    }

    #[test]
    fn signed_urls_use_fresh_nonces() {
        let provider = provider("https://ecs.aliyuncs.com");
        let request = RpcRequest::new(DESCRIBE_SECURITY_GROUP_ATTRIBUTE);
        let first = provider.signed_url(&request).unwrap();
        let second = provider.signed_url(&request).unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let provider = provider("http://127.0.0.1:9");
        let err = provider
            .describe_security_group("eu-west-1", "sg-123")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
