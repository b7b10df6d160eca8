//! Query - Validate lookup parameters and load a security group

use log::{debug, info};
use thiserror::Error;

use crate::provider::{ProviderError, SecurityGroupProvider};
use crate::resource::SecurityGroup;

/// Required construction parameters were missing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Parameters identifying one security group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityGroupQuery {
    pub group_id: String,
    pub region: String,
}

impl SecurityGroupQuery {
    pub fn new(group_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            region: region.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.group_id.trim().is_empty() {
            missing.push("group_id");
        }
        if self.region.trim().is_empty() {
            missing.push("region");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingParameters(missing))
        }
    }
}

/// Fetch a security group, mapping "not found" to the empty sentinel group.
///
/// Parameters are validated before any network call. Every provider error
/// other than [`ProviderError::NotFound`] is returned to the caller.
pub async fn load_security_group<P>(
    provider: &P,
    query: &SecurityGroupQuery,
) -> Result<SecurityGroup, LoadError>
where
    P: SecurityGroupProvider + ?Sized,
{
    query.validate()?;

    debug!(
        "describing security group {} in {} via {}",
        query.group_id,
        query.region,
        provider.name()
    );

    match provider
        .describe_security_group(&query.region, &query.group_id)
        .await
    {
        Ok(group) => Ok(group),
        Err(err) if err.is_not_found() => {
            info!("{}", err);
            Ok(SecurityGroup::not_found(&query.group_id, &query.region))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Criteria;
    use crate::provider::{BoxFuture, ProviderResult};
    use crate::rule::{Policy, PortRange, Rule};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Found,
        NotFound,
        Throttled,
    }

    struct MockProvider {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SecurityGroupProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn describe_security_group(
            &self,
            region: &str,
            group_id: &str,
        ) -> BoxFuture<'_, ProviderResult<SecurityGroup>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let region = region.to_string();
            let group_id = group_id.to_string();
            Box::pin(async move {
                match self.behavior {
                    Behavior::Found => Ok(SecurityGroup::existing(group_id, region)
                        .with_name("web")
                        .with_vpc_id("vpc-1")
                        .with_permissions(vec![
                            Rule::ingress(Policy::Accept)
                                .with_source_cidr("0.0.0.0/0".parse().unwrap())
                                .with_port_range(PortRange::single(443)),
                            Rule::ingress(Policy::Accept)
                                .with_source_cidr("10.0.0.0/8".parse().unwrap()),
                            Rule::egress(Policy::Accept)
                                .with_source_cidr("0.0.0.0/0".parse().unwrap()),
                        ])),
                    Behavior::NotFound => Err(ProviderError::not_found(group_id, region)),
                    Behavior::Throttled => Err(ProviderError::Api {
                        status: 400,
                        code: "Throttling".to_string(),
                        message: "Request was denied due to request throttling.".to_string(),
                        request_id: "req-1".to_string(),
                    }),
                }
            })
        }
    }

    #[tokio::test]
    async fn load_existing_group() {
        let provider = MockProvider::new(Behavior::Found);
        let query = SecurityGroupQuery::new("sg-123", "eu-west-1");
        let group = load_security_group(&provider, &query).await.unwrap();

        assert!(group.exists());
        assert_eq!(group.id(), "sg-123");
        assert_eq!(group.inbound_rules_count(), 2);
        assert_eq!(group.outbound_rules_count(), 1);
        assert!(group.allows(&"1.2.3.4/32:443".parse().unwrap()));
    }

    #[tokio::test]
    async fn not_found_maps_to_empty_group() {
        let provider = MockProvider::new(Behavior::NotFound);
        let query = SecurityGroupQuery::new("sg-missing", "eu-west-1");
        let group = load_security_group(&provider, &query).await.unwrap();

        assert!(!group.exists());
        assert_eq!(group.inbound_rules_count(), 0);
        assert!(!group.allows(&"0.0.0.0/0".parse().unwrap()));
        assert!(!group.allows(&Criteria::new().ipv4_range("1.2.3.4").unwrap().port(22)));
    }

    #[tokio::test]
    async fn other_provider_errors_propagate() {
        let provider = MockProvider::new(Behavior::Throttled);
        let query = SecurityGroupQuery::new("sg-123", "eu-west-1");
        let result = load_security_group(&provider, &query).await;

        match result {
            Err(LoadError::Provider(ProviderError::Api { code, .. })) => {
                assert_eq!(code, "Throttling")
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_parameters_fail_before_network_call() {
        let provider = MockProvider::new(Behavior::Found);
        let query = SecurityGroupQuery::new("", " ");
        let result = load_security_group(&provider, &query).await;

        match result {
            Err(LoadError::Validation(ValidationError::MissingParameters(missing))) => {
                assert_eq!(missing, vec!["group_id", "region"]);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validation_error_display() {
        let err = SecurityGroupQuery::new("sg-1", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter(s): region");
    }
}
