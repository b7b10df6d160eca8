//! Resource - A fetched security group and the queries over it

use std::fmt;

use serde::Serialize;

use crate::criteria::Criteria;
use crate::matcher;
use crate::rule::{Direction, Rule};

/// Identifier carried by a group that the provider reported as not existing
pub const NOT_FOUND_GROUP_ID: &str = "empty response";

/// Security group state fetched from the provider
///
/// Built once per query and never mutated afterwards. A group the provider
/// reported as missing is represented by [`SecurityGroup::not_found`]: it has no
/// rules and carries [`NOT_FOUND_GROUP_ID`], so existence checks stay separate
/// from rule checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityGroup {
    id: String,
    name: String,
    description: String,
    vpc_id: String,
    region: String,
    inbound_rules: Vec<Rule>,
    outbound_rules: Vec<Rule>,
    exists: bool,
    #[serde(skip)]
    requested_id: String,
}

impl SecurityGroup {
    pub fn existing(id: impl Into<String>, region: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            requested_id: id.clone(),
            id,
            name: String::new(),
            description: String::new(),
            vpc_id: String::new(),
            region: region.into(),
            inbound_rules: Vec::new(),
            outbound_rules: Vec::new(),
            exists: true,
        }
    }

    pub fn not_found(requested_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: NOT_FOUND_GROUP_ID.to_string(),
            name: String::new(),
            description: String::new(),
            vpc_id: String::new(),
            region: region.into(),
            inbound_rules: Vec::new(),
            outbound_rules: Vec::new(),
            exists: false,
            requested_id: requested_id.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_vpc_id(mut self, vpc_id: impl Into<String>) -> Self {
        self.vpc_id = vpc_id.into();
        self
    }

    /// Split the full permission set into inbound and outbound rules, keeping provider order
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Rule>) -> Self {
        let (inbound, outbound): (Vec<Rule>, Vec<Rule>) = permissions
            .into_iter()
            .partition(|rule| rule.direction == Direction::Ingress);
        self.inbound_rules = inbound;
        self.outbound_rules = outbound;
        self
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Whether the inbound rules admit traffic matching `criteria`.
    ///
    /// See [`matcher::allows`] for the exact semantics.
    pub fn allows(&self, criteria: &Criteria) -> bool {
        if self.inbound_rules.is_empty() {
            return false;
        }
        matcher::allows(&self.inbound_rules, criteria)
    }

    /// Alias of [`SecurityGroup::allows`]
    pub fn allow_in(&self, criteria: &Criteria) -> bool {
        self.allows(criteria)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn inbound_rules(&self) -> &[Rule] {
        &self.inbound_rules
    }

    pub fn outbound_rules(&self) -> &[Rule] {
        &self.outbound_rules
    }

    pub fn inbound_rules_count(&self) -> usize {
        self.inbound_rules.len()
    }

    pub fn outbound_rules_count(&self) -> usize {
        self.outbound_rules.len()
    }
}

impl fmt::Display for SecurityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ECS Security Group:")?;
        if self.exists {
            write!(f, " ID: {}", self.id)?;
            if !self.name.is_empty() {
                write!(f, " Name: {}", self.name)?;
            }
            if !self.vpc_id.is_empty() {
                write!(f, " VPC ID: {}", self.vpc_id)?;
            }
        } else {
            write!(f, " {}", self.requested_id)?;
        }
        if !self.region.is_empty() {
            write!(f, " in {}", self.region)?;
        }
        Ok(())
    }
}
