//! Fixture files in the build directory
//!
//! Terraform reads a JSON variable file; the test runner reads a YAML
//! attribute file. Both are written from the same [`FixtureConfig`].

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::config::FixtureConfig;
use crate::error::{FixtureError, FixtureResult};

/// Default Terraform variable file name
pub const DEFAULT_TFVARS_FILE: &str = "alicloud-inspec.tfvars.json";
/// Default test attribute file name
pub const DEFAULT_ATTRIBUTES_FILE: &str = "alicloud-inspec-attributes.yaml";

/// Flat attribute mapping as stored in the YAML file, in file order
pub type Attributes = serde_yaml::Mapping;

fn write_file(path: &Path, content: &str) -> FixtureResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            FixtureError::io(format!("Failed to create {}", parent.display()), e)
        })?;
    }

    fs::write(path, content)
        .map_err(|e| FixtureError::io(format!("Failed to write {}", path.display()), e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn to_yaml<T: Serialize>(value: &T) -> FixtureResult<String> {
    serde_yaml::to_string(value)
        .map_err(|e| FixtureError::Serialization(format!("Failed to serialize YAML: {}", e)))
}

/// Write the Terraform variable file, returning its path
pub fn store_json(
    config: &FixtureConfig,
    build_dir: &Path,
    file_name: &str,
) -> FixtureResult<PathBuf> {
    let path = build_dir.join(file_name);
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| FixtureError::Serialization(format!("Failed to serialize JSON: {}", e)))?;
    write_file(&path, &content)?;
    Ok(path)
}

/// Write the test attribute file, returning its path
pub fn store_yaml(
    config: &FixtureConfig,
    build_dir: &Path,
    file_name: &str,
) -> FixtureResult<PathBuf> {
    let path = build_dir.join(file_name);
    write_file(&path, &to_yaml(config)?)?;
    Ok(path)
}

pub fn read_attributes(path: &Path) -> FixtureResult<Attributes> {
    let content = fs::read_to_string(path)
        .map_err(|e| FixtureError::io(format!("Failed to read {}", path.display()), e))?;

    serde_yaml::from_str(&content).map_err(|e| {
        FixtureError::InvalidAttributes(format!("Failed to parse {}: {}", path.display(), e))
    })
}

pub fn write_attributes(path: &Path, attributes: &Attributes) -> FixtureResult<()> {
    write_file(path, &to_yaml(attributes)?)
}
