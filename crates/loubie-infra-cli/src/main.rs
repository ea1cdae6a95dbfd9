//! `loubie-infra` entry point.
//!
//! Assembles the per-environment provisioning plan and either renders
//! it (`synth`) or runs a dry-run deploy and prints the published
//! outputs (`outputs`). Actual resource creation belongs to the
//! external provisioning system behind the `Provisioner` trait.

use clap::{Parser, Subcommand};
use loubie_infra::{
    output::published_outputs,
    provision::{DeployError, DryRunProvisioner, deploy},
    stack::{DeployContext, StackPlan},
};
use std::{convert::Infallible, process::ExitCode};
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "loubie-infra",
    about = "Provisioning plans for the Loubie Designs portfolio",
    version
)]
struct Cli {
    /// Deployment environment identifier; unknown values resolve to dev.
    #[arg(long, env = "LOUBIE_ENV")]
    environment: Option<String>,

    /// Deployment account coordinate.
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: String,

    /// Deployment region coordinate.
    #[arg(long, env = "CDK_DEFAULT_REGION", default_value = "us-west-2")]
    region: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assemble and validate the plan, then print it as JSON.
    Synth,

    /// Dry-run the deployment and print the published outputs.
    Outputs,
}

#[derive(Debug, ThisError)]
enum CliError {
    #[error(transparent)]
    Plan(#[from] loubie_infra::Error),

    #[error(transparent)]
    Deploy(#[from] DeployError<Infallible>),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = DeployContext {
        environment: cli.environment,
        account: cli.account,
        region: cli.region,
    };

    let plan = StackPlan::assemble(&ctx)?;

    match cli.command {
        Command::Synth => {
            plan.validate()
                .map_err(|e| CliError::Plan(loubie_infra::Error::Validation(e)))?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Outputs => {
            let deployed = deploy(plan, &mut DryRunProvisioner::default())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&published_outputs(&deployed))?
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
