//! Matcher - Decide whether a set of inbound rules admits given traffic

use crate::criteria::Criteria;
use crate::rule::Rule;

/// Returns true if any Accept rule admits traffic matching `criteria`.
///
/// Rules are evaluated in the order given (the provider's order; nothing is
/// re-sorted by priority) and the first match wins. Drop rules are skipped and
/// never block a later Accept rule, so a Drop rule for `0.0.0.0/0` followed by
/// an Accept rule for `10.0.0.0/8` still admits `10.1.1.1/32`. If the provider
/// does not return rules in a stable order, results that depend on ordering
/// may differ between fetches.
///
/// A rule matches when its source CIDR fully contains the queried range and,
/// if a port was queried, the port lies within the rule's inclusive range.
pub fn allows<'a, I>(inbound_rules: I, criteria: &Criteria) -> bool
where
    I: IntoIterator<Item = &'a Rule>,
{
    let Some(range) = criteria.ipv4_range.as_ref() else {
        return false;
    };

    for rule in inbound_rules {
        if !rule.is_accept() || !rule.covers(range) {
            continue;
        }

        match criteria.port {
            None => return true,
            Some(port) if rule.port_range.contains(port) => return true,
            Some(_) => {}
        }
    }

    false
}
