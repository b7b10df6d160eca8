//! alicheck Fixtures
//!
//! Seed configuration for Terraform-driven integration tests.
//!
//! # Overview
//!
//! - **FixtureConfig**: random resource names and default parameters, with
//!   environment overrides
//! - **store**: writes the Terraform variable file (JSON) and the test
//!   attribute file (YAML)
//! - **terraform**: reads declared outputs back from Terraform and merges them
//!   into the attribute file
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use alicheck_fixture::{
//!     DEFAULT_ATTRIBUTES_FILE, DEFAULT_OUTPUTS_FILE, DEFAULT_TFVARS_FILE, FixtureConfig,
//!     TerraformCli, harvest_outputs, store_json, store_yaml,
//! };
//!
//! # fn main() -> alicheck_fixture::FixtureResult<()> {
//! let build_dir = Path::new("build");
//! let config = FixtureConfig::from_env();
//! store_json(&config, build_dir, DEFAULT_TFVARS_FILE)?;
//! store_yaml(&config, build_dir, DEFAULT_ATTRIBUTES_FILE)?;
//!
//! // ... terraform apply ...
//!
//! let terraform = TerraformCli::new(build_dir);
//! harvest_outputs(build_dir, DEFAULT_ATTRIBUTES_FILE, DEFAULT_OUTPUTS_FILE, &terraform)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod terraform;

// Re-export main types for convenience
pub use config::FixtureConfig;
pub use error::{FixtureError, FixtureResult};
pub use store::{DEFAULT_ATTRIBUTES_FILE, DEFAULT_TFVARS_FILE, store_json, store_yaml};
pub use terraform::{
    DEFAULT_OUTPUTS_FILE, OutputSource, TerraformCli, harvest_outputs, tf_output_names,
};
