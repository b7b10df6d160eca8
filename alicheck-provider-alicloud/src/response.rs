//! ECS API response bodies and their conversion into the core model

use alicheck_core::provider::{ProviderError, ProviderResult, SECURITY_GROUP_NOT_FOUND_CODE};
use alicheck_core::resource::SecurityGroup;
use alicheck_core::rule::{Direction, Policy, PortRange, Rule, parse_ipv4_cidr};
use serde::Deserialize;

/// Body of a successful `DescribeSecurityGroupAttribute` call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSecurityGroupAttributeResponse {
    #[serde(default)]
    pub request_id: String,
    pub security_group_id: String,
    #[serde(default)]
    pub security_group_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub region_id: String,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Permissions {
    #[serde(default)]
    pub permission: Vec<Permission>,
}

/// One entry of `Permissions.Permission`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Permission {
    pub direction: String,
    pub policy: String,
    #[serde(default)]
    pub source_cidr_ip: String,
    #[serde(default)]
    pub port_range: Option<String>,
    #[serde(default)]
    pub ip_protocol: String,
    /// Returned as a string by some API versions and as a number by others
    #[serde(default)]
    pub priority: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
}

impl Permission {
    /// Convert into a core [`Rule`]. Malformed fields are a fatal response error.
    pub fn to_rule(&self) -> ProviderResult<Rule> {
        let direction: Direction = self
            .direction
            .parse()
            .map_err(|e| ProviderError::malformed(format!("{}", e)))?;
        let policy: Policy = self
            .policy
            .parse()
            .map_err(|e| ProviderError::malformed(format!("{}", e)))?;
        let port_range: PortRange = self
            .port_range
            .as_deref()
            .unwrap_or("")
            .parse()
            .map_err(|e| ProviderError::malformed(format!("{}", e)))?;

        let mut rule = Rule::new(direction, policy)
            .with_port_range(port_range)
            .with_protocol(&self.ip_protocol)
            .with_description(&self.description);

        // Empty for rules that reference a source group or an IPv6 range
        if !self.source_cidr_ip.trim().is_empty() {
            let cidr = parse_ipv4_cidr(&self.source_cidr_ip)
                .map_err(|e| ProviderError::malformed(format!("{}", e)))?;
            rule = rule.with_source_cidr(cidr);
        }

        if let Some(priority) = self.priority.as_ref().and_then(priority_value) {
            rule = rule.with_priority(priority);
        }

        Ok(rule)
    }
}

fn priority_value(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl DescribeSecurityGroupAttributeResponse {
    /// Build the core model. `region` is used when the body omits `RegionId`.
    pub fn into_security_group(self, region: &str) -> ProviderResult<SecurityGroup> {
        let rules = self
            .permissions
            .permission
            .iter()
            .map(Permission::to_rule)
            .collect::<ProviderResult<Vec<_>>>()
            .map_err(|e| match e {
                ProviderError::MalformedResponse(msg) => ProviderError::malformed(format!(
                    "security group {}: {}",
                    self.security_group_id, msg
                )),
                other => other,
            })?;

        let region = if self.region_id.is_empty() {
            region.to_string()
        } else {
            self.region_id
        };

        Ok(SecurityGroup::existing(self.security_group_id, region)
            .with_name(self.security_group_name)
            .with_description(self.description)
            .with_vpc_id(self.vpc_id)
            .with_permissions(rules))
    }
}

/// Body of a failed API call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub request_id: String,
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Interpret the HTTP status and body of a `DescribeSecurityGroupAttribute` call
///
/// Only the `InvalidSecurityGroupId.NotFound` code becomes
/// [`ProviderError::NotFound`]; every other error code is [`ProviderError::Api`].
pub fn parse_describe_response(
    status: u16,
    body: &str,
    region: &str,
    group_id: &str,
) -> ProviderResult<SecurityGroup> {
    if (200..300).contains(&status) {
        let response: DescribeSecurityGroupAttributeResponse =
            serde_json::from_str(body).map_err(|e| {
                ProviderError::malformed(format!(
                    "Failed to parse security group {}: {}",
                    group_id, e
                ))
            })?;
        return response.into_security_group(region);
    }

    let error: ErrorResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed(format!("HTTP {} with unreadable error body: {}", status, e))
    })?;

    if error.code == SECURITY_GROUP_NOT_FOUND_CODE {
        Err(ProviderError::not_found(group_id, region))
    } else {
        Err(ProviderError::Api {
            status,
            code: error.code,
            message: error.message,
            request_id: error.request_id,
        })
    }
}
