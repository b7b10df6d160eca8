//! Rule - A single security group permission entry

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while interpreting the fields of a permission entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("Unknown rule direction: {0:?}")]
    Direction(String),

    #[error("Unknown rule policy: {0:?}")]
    Policy(String),

    /// Port range is not `<start>/<end>`, or the bounds are out of order
    #[error("Invalid port range: {0:?}")]
    PortRange(String),

    #[error("Invalid IPv4 CIDR: {0:?}")]
    Cidr(String),
}

/// Traffic direction relative to the protected resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ingress,
    Egress,
}

impl FromStr for Direction {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ingress" => Ok(Direction::Ingress),
            "egress" => Ok(Direction::Egress),
            _ => Err(RuleParseError::Direction(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ingress => write!(f, "ingress"),
            Direction::Egress => write!(f, "egress"),
        }
    }
}

/// Whether a rule permits or denies the traffic it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    Accept,
    Drop,
}

impl FromStr for Policy {
    type Err = RuleParseError;

    /// The API has returned both `Accept` and `accept` over time
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Policy::Accept),
            "drop" => Ok(Policy::Drop),
            _ => Err(RuleParseError::Policy(s.to_string())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Accept => write!(f, "Accept"),
            Policy::Drop => write!(f, "Drop"),
        }
    }
}

/// Inclusive port range of a rule
///
/// The provider encodes ranges as `"<start>/<end>"` and uses `"-1/-1"` for
/// rules that are not restricted to any port (ICMP, all protocols).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PortRange {
    /// No port restriction
    Any,
    Range { start: u16, end: u16 },
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, RuleParseError> {
        if start > end {
            return Err(RuleParseError::PortRange(format!("{}/{}", start, end)));
        }
        Ok(PortRange::Range { start, end })
    }

    pub fn single(port: u16) -> Self {
        PortRange::Range {
            start: port,
            end: port,
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        match self {
            PortRange::Any => true,
            PortRange::Range { start, end } => *start <= port && port <= *end,
        }
    }
}

impl FromStr for PortRange {
    type Err = RuleParseError;

    /// Parses `"<start>/<end>"`. An empty string or `"-1/-1"` means [`PortRange::Any`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(PortRange::Any);
        }

        let invalid = || RuleParseError::PortRange(s.to_string());
        let (start, end) = trimmed.split_once('/').ok_or_else(invalid)?;
        let (start, end) = (start.trim(), end.trim());

        if start == "-1" && end == "-1" {
            return Ok(PortRange::Any);
        }

        let start: u16 = start.parse().map_err(|_| invalid())?;
        let end: u16 = end.parse().map_err(|_| invalid())?;
        PortRange::new(start, end).map_err(|_| invalid())
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRange::Any => write!(f, "-1/-1"),
            PortRange::Range { start, end } => write!(f, "{}/{}", start, end),
        }
    }
}

impl From<PortRange> for String {
    fn from(range: PortRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for PortRange {
    type Error = RuleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse an IPv4 CIDR range. A bare address is taken as a `/32`.
pub fn parse_ipv4_cidr(value: &str) -> Result<Ipv4Net, RuleParseError> {
    let value = value.trim();
    if let Ok(net) = value.parse::<Ipv4Net>() {
        return Ok(net);
    }
    value
        .parse::<Ipv4Addr>()
        .ok()
        .and_then(|addr| Ipv4Net::new(addr, 32).ok())
        .ok_or_else(|| RuleParseError::Cidr(value.to_string()))
}

/// One inbound or outbound permission of a security group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub direction: Direction,
    pub policy: Policy,
    /// IPv4 source range. `None` for rules that reference a source group or an IPv6 range.
    pub source_cidr: Option<Ipv4Net>,
    pub port_range: PortRange,
    /// Informational only, never used for matching
    pub protocol: String,
    /// Informational only, never used for matching
    pub priority: Option<i64>,
    pub description: String,
}

impl Rule {
    pub fn new(direction: Direction, policy: Policy) -> Self {
        Self {
            direction,
            policy,
            source_cidr: None,
            port_range: PortRange::Any,
            protocol: String::new(),
            priority: None,
            description: String::new(),
        }
    }

    pub fn ingress(policy: Policy) -> Self {
        Self::new(Direction::Ingress, policy)
    }

    pub fn egress(policy: Policy) -> Self {
        Self::new(Direction::Egress, policy)
    }

    pub fn with_source_cidr(mut self, cidr: Ipv4Net) -> Self {
        self.source_cidr = Some(cidr);
        self
    }

    pub fn with_port_range(mut self, port_range: PortRange) -> Self {
        self.port_range = port_range;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_accept(&self) -> bool {
        self.policy == Policy::Accept
    }

    /// True if the rule's source range fully contains `range` (subset or equal, not overlap)
    pub fn covers(&self, range: &Ipv4Net) -> bool {
        self.source_cidr
            .as_ref()
            .is_some_and(|cidr| cidr.contains(range))
    }
}
