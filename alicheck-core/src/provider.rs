//! Provider - Trait abstracting security group lookups
//!
//! A provider resolves a `(region, group id)` pair to a [`SecurityGroup`] by
//! calling a cloud API. "Not found" is a typed error so that it can be told
//! apart from every other failure.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::resource::SecurityGroup;

/// Error code the ECS API returns for a security group id that does not exist
pub const SECURITY_GROUP_NOT_FOUND_CODE: &str = "InvalidSecurityGroupId.NotFound";

/// Error type for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The group does not exist. The only non-fatal failure.
    #[error("Security group {group_id} not found in {region}")]
    NotFound { group_id: String, region: String },

    /// Any other error code returned by the cloud API (auth, throttling, bad request, ...)
    #[error("API error {code} (HTTP {status}): {message} [request ID: {request_id}]")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: String,
    },

    /// The request never produced an API response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with something that could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    pub fn not_found(group_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self::NotFound {
            group_id: group_id.into(),
            region: region.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetch contract for security groups
///
/// Implementations make one API round trip per call and do not retry.
pub trait SecurityGroupProvider: Send + Sync {
    /// Name of this provider (e.g., "alicloud")
    fn name(&self) -> &'static str;

    /// Describe a security group and all of its permissions.
    ///
    /// Returns [`ProviderError::NotFound`] only when the API reports that the
    /// group does not exist.
    fn describe_security_group(
        &self,
        region: &str,
        group_id: &str,
    ) -> BoxFuture<'_, ProviderResult<SecurityGroup>>;
}

/// Enables dynamic dispatch for providers
impl SecurityGroupProvider for Box<dyn SecurityGroupProvider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn describe_security_group(
        &self,
        region: &str,
        group_id: &str,
    ) -> BoxFuture<'_, ProviderResult<SecurityGroup>> {
        (**self).describe_security_group(region, group_id)
    }
}
