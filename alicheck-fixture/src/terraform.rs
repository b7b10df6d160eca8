//! Terraform outputs: discover declared outputs and merge their values into
//! the test attribute file

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::error::{FixtureError, FixtureResult};
use crate::store::{read_attributes, write_attributes};

/// File in the build directory that declares the outputs
pub const DEFAULT_OUTPUTS_FILE: &str = "outputs.tf";

/// Names of the outputs declared in `content`.
///
/// Every line starting with `output` is taken as an output block header
/// (`output "name" {`).
pub fn parse_output_names(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("output"))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .filter_map(|rest| {
            let rest = rest.trim();
            let name = match rest.strip_prefix('"') {
                Some(quoted) => quoted.split('"').next()?,
                None => rest.split(|c: char| c.is_whitespace() || c == '{').next()?,
            };
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Read `file_name` from `build_dir` and return the declared output names
pub fn tf_output_names(build_dir: &Path, file_name: &str) -> FixtureResult<Vec<String>> {
    let path = build_dir.join(file_name);
    let content = fs::read_to_string(&path)
        .map_err(|e| FixtureError::io(format!("Failed to read {}", path.display()), e))?;
    Ok(parse_output_names(&content))
}

/// Something that can resolve the value of a Terraform output
pub trait OutputSource {
    fn output(&self, name: &str) -> FixtureResult<String>;
}

/// Runs `terraform output -raw <name>` in a working directory
pub struct TerraformCli {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl TerraformCli {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from("terraform"),
            working_dir: working_dir.into(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl OutputSource for TerraformCli {
    fn output(&self, name: &str) -> FixtureResult<String> {
        debug!("terraform output -raw {}", name);
        let output = Command::new(&self.binary)
            .args(["output", "-raw", name])
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| {
                FixtureError::Terraform(format!(
                    "Failed to run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(FixtureError::Terraform(format!(
                "output {} failed: {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Merge every declared output into the attribute file and rewrite it.
///
/// Outputs are assumed to be single values. Returns the merged names.
pub fn harvest_outputs(
    build_dir: &Path,
    attributes_file: &str,
    outputs_file: &str,
    source: &dyn OutputSource,
) -> FixtureResult<Vec<String>> {
    let attributes_path = build_dir.join(attributes_file);
    let mut attributes = read_attributes(&attributes_path)?;
    let names = tf_output_names(build_dir, outputs_file)?;

    for name in &names {
        let value = source.output(name)?;
        attributes.insert(
            serde_yaml::Value::String(name.clone()),
            serde_yaml::Value::String(value.trim().to_string()),
        );
    }

    write_attributes(&attributes_path, &attributes)?;
    info!(
        "merged {} output(s) into {}",
        names.len(),
        attributes_path.display()
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;
    use crate::store::{DEFAULT_ATTRIBUTES_FILE, store_yaml};
    use std::collections::HashMap;
    use tempfile::tempdir;

    const OUTPUTS_TF: &str = r#"output "alicloud_vpc_id" {
  value = "${alicloud_vpc.inspec_vpc.id}"
}

output "alicloud_security_group_id" {
  value = "${alicloud_security_group.inspec_sg.id}"
}

# output "commented_out" {}
outputs_note = "not an output"
"#;

    struct FakeOutputs(HashMap<String, String>);

    impl OutputSource for FakeOutputs {
        fn output(&self, name: &str) -> FixtureResult<String> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| FixtureError::Terraform(format!("no output {}", name)))
        }
    }

    #[test]
    fn test_parse_output_names() {
        assert_eq!(
            parse_output_names(OUTPUTS_TF),
            vec!["alicloud_vpc_id", "alicloud_security_group_id"]
        );
    }

    #[test]
    fn test_parse_unquoted_output_name() {
        assert_eq!(parse_output_names("output vpc_id {\n}\n"), vec!["vpc_id"]);
    }

    #[test]
    fn test_harvest_outputs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_OUTPUTS_FILE), OUTPUTS_TF).unwrap();
        let config = FixtureConfig::defaults(None);
        store_yaml(&config, dir.path(), DEFAULT_ATTRIBUTES_FILE).unwrap();

        let source = FakeOutputs(
            [
                ("alicloud_vpc_id", "vpc-abc\n"),
                ("alicloud_security_group_id", "sg-def"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );

        let merged = harvest_outputs(
            dir.path(),
            DEFAULT_ATTRIBUTES_FILE,
            DEFAULT_OUTPUTS_FILE,
            &source,
        )
        .unwrap();
        assert_eq!(merged.len(), 2);

        let attributes = read_attributes(&dir.path().join(DEFAULT_ATTRIBUTES_FILE)).unwrap();
        assert_eq!(
            attributes.get("alicloud_vpc_id"),
            Some(&serde_yaml::Value::from("vpc-abc"))
        );
        assert_eq!(
            attributes.get("alicloud_security_group_id"),
            Some(&serde_yaml::Value::from("sg-def"))
        );
        // Seed values survive the merge and keep their place
        assert_eq!(attributes.len(), config.len() + 2);
        let first = attributes.iter().next().map(|(k, _)| k.clone());
        assert_eq!(first, Some(serde_yaml::Value::from("alicloud_region")));
    }

    #[test]
    fn test_harvest_fails_on_output_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_OUTPUTS_FILE), OUTPUTS_TF).unwrap();
        store_yaml(
            &FixtureConfig::defaults(None),
            dir.path(),
            DEFAULT_ATTRIBUTES_FILE,
        )
        .unwrap();

        let source = FakeOutputs(HashMap::new());
        let result = harvest_outputs(
            dir.path(),
            DEFAULT_ATTRIBUTES_FILE,
            DEFAULT_OUTPUTS_FILE,
            &source,
        );
        assert!(matches!(result, Err(FixtureError::Terraform(_))));
    }

    #[test]
    fn test_terraform_cli_missing_binary() {
        let dir = tempdir().unwrap();
        let cli = TerraformCli::new(dir.path()).with_binary("/nonexistent/terraform");
        let result = cli.output("alicloud_vpc_id");
        assert!(matches!(result, Err(FixtureError::Terraform(_))));
    }
}
