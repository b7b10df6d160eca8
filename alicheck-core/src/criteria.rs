//! Criteria - What traffic an `allows` query asks about

use std::fmt;
use std::str::FromStr;

use ipnet::Ipv4Net;
use thiserror::Error;

use crate::rule::parse_ipv4_cidr;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("Invalid IPv4 range: {0:?}")]
    InvalidRange(String),

    #[error("Invalid port: {0:?}")]
    InvalidPort(String),
}

/// Traffic criteria for [`SecurityGroup::allows`](crate::resource::SecurityGroup::allows)
///
/// `ipv4_range` is required for a query to match anything; `port` is optional
/// so that checks can be written against CIDR masks only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub ipv4_range: Option<Ipv4Net>,
    pub port: Option<u16>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queried range from its textual form (`"10.0.0.0/8"` or `"10.1.2.3"`)
    pub fn ipv4_range(self, range: &str) -> Result<Self, CriteriaError> {
        let net = parse_ipv4_cidr(range).map_err(|_| CriteriaError::InvalidRange(range.into()))?;
        Ok(self.with_ipv4_range(net))
    }

    pub fn with_ipv4_range(mut self, range: Ipv4Net) -> Self {
        self.ipv4_range = Some(range);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

impl FromStr for Criteria {
    type Err = CriteriaError;

    /// Parses `CIDR[:PORT]`, e.g. `0.0.0.0/0:443` or `10.0.0.0/8`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.rsplit_once(':') {
            Some((range, port)) => {
                let port: u16 = port
                    .trim()
                    .parse()
                    .map_err(|_| CriteriaError::InvalidPort(port.to_string()))?;
                Ok(Criteria::new().ipv4_range(range)?.port(port))
            }
            None => Criteria::new().ipv4_range(s),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ipv4_range {
            Some(range) => write!(f, "ipv4_range: {}", range)?,
            None => write!(f, "ipv4_range: <none>")?,
        }
        if let Some(port) = self.port {
            write!(f, ", port: {}", port)?;
        }
        Ok(())
    }
}
