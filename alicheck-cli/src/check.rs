//! Expectations evaluated by `alicheck check`

use std::fmt;

use alicheck_core::{Criteria, SecurityGroup};

/// One assertion about a security group
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Exists,
    Absent,
    AllowIn(Criteria),
    DenyIn(Criteria),
}

impl Expectation {
    pub fn holds_for(&self, group: &SecurityGroup) -> bool {
        match self {
            Expectation::Exists => group.exists(),
            Expectation::Absent => !group.exists(),
            Expectation::AllowIn(criteria) => group.allow_in(criteria),
            Expectation::DenyIn(criteria) => !group.allow_in(criteria),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Exists => write!(f, "should exist"),
            Expectation::Absent => write!(f, "should not exist"),
            Expectation::AllowIn(criteria) => write!(f, "should allow in {}", criteria),
            Expectation::DenyIn(criteria) => write!(f, "should not allow in {}", criteria),
        }
    }
}

/// Result of evaluating one expectation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub expectation: Expectation,
    pub passed: bool,
}

pub fn evaluate(group: &SecurityGroup, expectations: &[Expectation]) -> Vec<Outcome> {
    expectations
        .iter()
        .map(|expectation| Outcome {
            expectation: expectation.clone(),
            passed: expectation.holds_for(group),
        })
        .collect()
}
