//! Fixture configuration: seed values shared by Terraform and the test attributes
//!
//! Built once at start-up and passed to whatever needs it. For every key, an
//! environment variable named by the uppercased key takes precedence over the
//! generated default.

use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};

/// Lowercase variable read for the default region
pub const REGION_ENV: &str = "alicloud_region";
pub const DEFAULT_REGION: &str = "eu-west-1";
/// Length of the random part of generated resource names
pub const RANDOM_SUFFIX_LEN: usize = 25;

/// Random lowercase ASCII letters
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

fn random_name(prefix: &str) -> Value {
    Value::String(format!("{}-{}", prefix, random_suffix(RANDOM_SUFFIX_LEN)))
}

/// Key-value seed configuration for fixture resources.
///
/// Keys keep their definition order in the written files.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FixtureConfig {
    values: Map<String, Value>,
}

impl FixtureConfig {
    /// Generated defaults, before any environment override
    pub fn defaults(region: Option<String>) -> Self {
        let region = region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let entries = [
            ("alicloud_region", Value::String(region)),
            ("alicloud_vpc_name", random_name("vpc")),
            ("alicloud_vpc_cidr", Value::from("10.0.1.0/24")),
            ("alicloud_security_group_name", random_name("sg")),
            (
                "alicloud_security_group_description",
                Value::from("Test security group for inspec"),
            ),
            ("alicloud_action_trail_ram_role_name", random_name("atrr")),
            (
                "alicloud_action_trail_ram_role_description",
                Value::from("ActionTrail ram role"),
            ),
            ("alicloud_action_trail_ram_policy_name", random_name("atrp")),
            (
                "alicloud_action_trail_ram_policy_description",
                Value::from("ActionTrail ram policy"),
            ),
            ("alicloud_action_trail_name", random_name("at")),
            ("alicloud_action_trail_bucket_name", random_name("atb")),
            // Set to 0 to skip resource creation while prototyping
            ("alicloud_enable_create", Value::from(1)),
        ];

        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    /// Defaults plus overrides, read from the process environment
    pub fn from_env() -> Self {
        Self::generate(|key| std::env::var(key).ok())
    }

    /// Defaults plus overrides, read from an arbitrary variable lookup
    pub fn generate(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::defaults(lookup(REGION_ENV));
        config.apply_overrides(lookup);
        config
    }

    /// Replace each value whose uppercased key is set in `lookup`.
    ///
    /// Integer values stay integers when the override parses as one.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (key, value) in self.values.iter_mut() {
            let Some(raw) = lookup(&key.to_uppercase()) else {
                continue;
            };
            *value = match (&*value, raw.trim().parse::<i64>()) {
                (Value::Number(_), Ok(n)) => Value::from(n),
                _ => Value::String(raw),
            };
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn random_suffix_is_lowercase_letters() {
        let suffix = random_suffix(RANDOM_SUFFIX_LEN);
        assert_eq!(suffix.len(), 25);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn defaults() {
        let config = FixtureConfig::defaults(None);
        assert_eq!(config.len(), 12);
        assert_eq!(config.get_str("alicloud_region"), Some("eu-west-1"));
        assert_eq!(config.get_str("alicloud_vpc_cidr"), Some("10.0.1.0/24"));
        assert_eq!(config.get("alicloud_enable_create"), Some(&Value::from(1)));

        let sg_name = config.get_str("alicloud_security_group_name").unwrap();
        assert!(sg_name.starts_with("sg-"));
        assert_eq!(sg_name.len(), "sg-".len() + RANDOM_SUFFIX_LEN);
    }

    #[test]
    fn keys_keep_definition_order() {
        let config = FixtureConfig::defaults(None);
        let keys: Vec<&str> = config.values().keys().map(String::as_str).collect();
        assert_eq!(keys.first(), Some(&"alicloud_region"));
        assert_eq!(keys.get(1), Some(&"alicloud_vpc_name"));
        assert_eq!(keys.last(), Some(&"alicloud_enable_create"));
    }

    #[test]
    fn generated_names_differ_between_runs() {
        let a = FixtureConfig::defaults(None);
        let b = FixtureConfig::defaults(None);
        assert_ne!(
            a.get_str("alicloud_vpc_name"),
            b.get_str("alicloud_vpc_name")
        );
    }

    #[test]
    fn region_comes_from_lowercase_variable() {
        let config = FixtureConfig::generate(lookup(&[("alicloud_region", "cn-hangzhou")]));
        assert_eq!(config.get_str("alicloud_region"), Some("cn-hangzhou"));
    }

    #[test]
    fn uppercase_variables_take_precedence() {
        let config = FixtureConfig::generate(lookup(&[
            ("alicloud_region", "cn-hangzhou"),
            ("ALICLOUD_REGION", "ap-southeast-1"),
            ("ALICLOUD_VPC_NAME", "vpc-fixed"),
        ]));
        assert_eq!(config.get_str("alicloud_region"), Some("ap-southeast-1"));
        assert_eq!(config.get_str("alicloud_vpc_name"), Some("vpc-fixed"));
    }

    #[test]
    fn integer_overrides_stay_integers() {
        let config = FixtureConfig::generate(lookup(&[("ALICLOUD_ENABLE_CREATE", "0")]));
        assert_eq!(config.get("alicloud_enable_create"), Some(&Value::from(0)));

        let config = FixtureConfig::generate(lookup(&[("ALICLOUD_ENABLE_CREATE", "no")]));
        assert_eq!(
            config.get("alicloud_enable_create"),
            Some(&Value::from("no"))
        );
    }

    #[test]
    fn string_values_are_not_coerced() {
        let config = FixtureConfig::generate(lookup(&[("ALICLOUD_VPC_NAME", "42")]));
        assert_eq!(config.get("alicloud_vpc_name"), Some(&Value::from("42")));
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let config = FixtureConfig::generate(lookup(&[("ALICLOUD_UNKNOWN", "x")]));
        assert_eq!(config.len(), 12);
        assert!(config.get("alicloud_unknown").is_none());
    }
}
