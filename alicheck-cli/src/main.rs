mod check;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use alicheck_core::{
    Criteria, Policy, Rule, SecurityGroup, SecurityGroupQuery, load_security_group,
};
use alicheck_fixture::{
    DEFAULT_ATTRIBUTES_FILE, DEFAULT_OUTPUTS_FILE, DEFAULT_TFVARS_FILE, FixtureConfig,
    TerraformCli, harvest_outputs, store_json, store_yaml,
};
use alicheck_provider_alicloud::{AliCloudConfig, AliCloudProvider};

use check::{Expectation, evaluate};

#[derive(Parser)]
#[command(name = "alicheck")]
#[command(about = "Compliance checks for AliCloud security groups", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which security group to read, and how
#[derive(Args)]
struct Target {
    /// Security group ID
    #[arg(value_name = "GROUP_ID")]
    group_id: Option<String>,

    #[arg(long = "group-id", alias = "id", hide = true, conflicts_with = "group_id")]
    group_id_flag: Option<String>,

    /// Region of the security group
    #[arg(long, env = "ALICLOUD_REGION")]
    region: Option<String>,

    /// HTTP timeout for the ECS API, in seconds
    #[arg(long, value_name = "SECS", default_value_t = AliCloudConfig::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

impl Target {
    fn query(&self) -> SecurityGroupQuery {
        let group_id = self.group_id.as_ref().or(self.group_id_flag.as_ref());
        SecurityGroupQuery::new(
            group_id.cloned().unwrap_or_default(),
            self.region.clone().unwrap_or_default(),
        )
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show a security group and its rules
    Describe {
        #[command(flatten)]
        target: Target,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Evaluate expectations against a security group
    Check {
        #[command(flatten)]
        target: Target,

        /// Expect the security group to exist
        #[arg(long, conflicts_with = "absent")]
        exists: bool,

        /// Expect the security group not to exist
        #[arg(long)]
        absent: bool,

        /// Expect inbound traffic from CIDR (and optionally PORT) to be allowed
        #[arg(long = "allow-in", value_name = "CIDR[:PORT]")]
        allow_in: Vec<Criteria>,

        /// Expect inbound traffic from CIDR (and optionally PORT) not to be allowed
        #[arg(long = "deny-in", value_name = "CIDR[:PORT]")]
        deny_in: Vec<Criteria>,
    },
    /// Fixture configuration for integration tests
    Fixture {
        #[command(subcommand)]
        command: FixtureCommands,
    },
}

#[derive(Subcommand)]
enum FixtureCommands {
    /// Write the Terraform variable file and the test attribute file
    Generate {
        /// Directory holding the Terraform configuration
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,
    },
    /// Merge Terraform outputs into the test attribute file
    Harvest {
        /// Directory holding the Terraform configuration
        #[arg(long, default_value = "build")]
        build_dir: PathBuf,

        /// Terraform executable
        #[arg(long, default_value = "terraform")]
        terraform: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Describe { target, format } => run_describe(&target, format).await,
        Commands::Check {
            target,
            exists,
            absent,
            allow_in,
            deny_in,
        } => {
            let expectations = expectations(exists, absent, allow_in, deny_in);
            run_check(&target, &expectations).await
        }
        Commands::Fixture { command } => run_fixture_command(command),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn expectations(
    exists: bool,
    absent: bool,
    allow_in: Vec<Criteria>,
    deny_in: Vec<Criteria>,
) -> Vec<Expectation> {
    let mut expectations = Vec::new();
    if exists {
        expectations.push(Expectation::Exists);
    }
    if absent {
        expectations.push(Expectation::Absent);
    }
    expectations.extend(allow_in.into_iter().map(Expectation::AllowIn));
    expectations.extend(deny_in.into_iter().map(Expectation::DenyIn));
    expectations
}

async fn fetch(target: &Target) -> Result<SecurityGroup, String> {
    let query = target.query();
    // Validate before reading credentials so a missing group id is reported first
    query.validate().map_err(|e| e.to_string())?;
    let config = AliCloudConfig::from_env()
        .map_err(|e| e.to_string())?
        .with_timeout(target.timeout());
    let provider = AliCloudProvider::new(config).map_err(|e| e.to_string())?;
    load_security_group(&provider, &query)
        .await
        .map_err(|e| e.to_string())
}

async fn run_describe(target: &Target, format: OutputFormat) -> Result<(), String> {
    let group = fetch(target).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&group)
                .map_err(|e| format!("Failed to serialize security group: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => print_group(&group),
    }

    Ok(())
}

fn print_group(group: &SecurityGroup) {
    println!("{}", group.to_string().bold());
    if !group.exists() {
        println!("  {}", "does not exist".yellow());
        return;
    }
    if !group.description().is_empty() {
        println!("  {}", group.description());
    }

    println!();
    println!("Inbound rules ({}):", group.inbound_rules_count());
    for rule in group.inbound_rules() {
        println!("  {}", format_rule(rule));
    }
    println!("Outbound rules ({}):", group.outbound_rules_count());
    for rule in group.outbound_rules() {
        println!("  {}", format_rule(rule));
    }
}

fn format_rule(rule: &Rule) -> String {
    let policy = match rule.policy {
        Policy::Accept => rule.policy.to_string().green(),
        Policy::Drop => rule.policy.to_string().red(),
    };
    let cidr = rule
        .source_cidr
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:<6} {:<18} {:<11} {}",
        policy,
        cidr,
        rule.port_range.to_string(),
        rule.protocol
    );
    if let Some(priority) = rule.priority {
        line.push_str(&format!(" (priority {})", priority));
    }
    if !rule.description.is_empty() {
        line.push_str(&format!(" # {}", rule.description));
    }
    line
}

async fn run_check(target: &Target, expectations: &[Expectation]) -> Result<(), String> {
    if expectations.is_empty() {
        return Err(
            "No expectations given (use --exists, --absent, --allow-in or --deny-in)".into(),
        );
    }

    let group = fetch(target).await?;
    println!("{}", group.to_string().bold());

    let outcomes = evaluate(&group, expectations);
    for outcome in &outcomes {
        if outcome.passed {
            println!("  {} {}", "✓".green(), outcome.expectation);
        } else {
            println!("  {} {}", "✗".red(), outcome.expectation);
        }
    }

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    println!();
    if failed == 0 {
        println!(
            "{}",
            format!("{} expectation(s) passed.", outcomes.len()).green()
        );
        Ok(())
    } else {
        Err(format!(
            "{} of {} expectation(s) failed",
            failed,
            outcomes.len()
        ))
    }
}

fn run_fixture_command(command: FixtureCommands) -> Result<(), String> {
    match command {
        FixtureCommands::Generate { build_dir } => run_fixture_generate(&build_dir),
        FixtureCommands::Harvest {
            build_dir,
            terraform,
        } => run_fixture_harvest(&build_dir, terraform),
    }
}

fn run_fixture_generate(build_dir: &Path) -> Result<(), String> {
    let config = FixtureConfig::from_env();

    let json = store_json(&config, build_dir, DEFAULT_TFVARS_FILE).map_err(|e| e.to_string())?;
    let yaml =
        store_yaml(&config, build_dir, DEFAULT_ATTRIBUTES_FILE).map_err(|e| e.to_string())?;

    println!("{} {}", "Wrote".green(), json.display());
    println!("{} {}", "Wrote".green(), yaml.display());
    Ok(())
}

fn run_fixture_harvest(build_dir: &Path, terraform: PathBuf) -> Result<(), String> {
    let source = TerraformCli::new(build_dir).with_binary(terraform);
    let merged = harvest_outputs(
        build_dir,
        DEFAULT_ATTRIBUTES_FILE,
        DEFAULT_OUTPUTS_FILE,
        &source,
    )
    .map_err(|e| e.to_string())?;

    if merged.is_empty() {
        println!("{}", "No outputs declared.".yellow());
    } else {
        for name in &merged {
            println!("  {} {}", "✓".green(), name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("alicheck").chain(args.iter().copied()))
    }

    #[test]
    fn describe_takes_positional_group_id() {
        let cli = parse(&["describe", "sg-1", "--region", "eu-west-1"]).unwrap();
        match cli.command {
            Commands::Describe { target, .. } => {
                let query = target.query();
                assert_eq!(query.group_id, "sg-1");
                assert_eq!(query.region, "eu-west-1");
                assert_eq!(target.timeout(), Duration::from_secs(30));
            }
            _ => panic!("expected describe"),
        }
    }

    #[test]
    fn check_takes_positional_group_id() {
        let cli = parse(&[
            "check",
            "sg-1",
            "--region",
            "eu-west-1",
            "--exists",
            "--deny-in",
            "0.0.0.0/0:22",
            "--timeout",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                target,
                exists,
                deny_in,
                ..
            } => {
                assert_eq!(target.query().group_id, "sg-1");
                assert!(exists);
                assert_eq!(deny_in, vec!["0.0.0.0/0:22".parse::<Criteria>().unwrap()]);
                assert_eq!(target.timeout(), Duration::from_secs(5));
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn group_id_flag_is_still_accepted() {
        let cli = parse(&["describe", "--id", "sg-2", "--region", "eu-west-1"]).unwrap();
        match cli.command {
            Commands::Describe { target, .. } => assert_eq!(target.query().group_id, "sg-2"),
            _ => panic!("expected describe"),
        }
    }

    #[test]
    fn positional_and_flag_group_id_conflict() {
        assert!(parse(&["describe", "sg-1", "--group-id", "sg-2", "--region", "r"]).is_err());
    }

    #[test]
    fn missing_group_id_fails_validation_not_parsing() {
        let cli = parse(&["describe", "--region", "eu-west-1"]).unwrap();
        match cli.command {
            Commands::Describe { target, .. } => assert!(target.query().validate().is_err()),
            _ => panic!("expected describe"),
        }
    }
}
