//! alicheck Core
//!
//! Security group model and rule matching for AliCloud compliance checks.
//! Data retrieval is delegated to a [`provider::SecurityGroupProvider`].

pub mod criteria;
pub mod matcher;
pub mod provider;
pub mod query;
pub mod resource;
pub mod rule;

pub use criteria::{Criteria, CriteriaError};
pub use provider::{ProviderError, ProviderResult, SecurityGroupProvider};
pub use query::{LoadError, SecurityGroupQuery, ValidationError, load_security_group};
pub use resource::{NOT_FOUND_GROUP_ID, SecurityGroup};
pub use rule::{Direction, Policy, PortRange, Rule, RuleParseError};
