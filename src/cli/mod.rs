//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// End-to-end checks for the email service API and its CDN-fronted site
#[derive(Parser, Debug)]
#[command(name = "email-e2e")]
#[command(version)]
#[command(about = "Readiness-gated e2e checks for the email service and static site")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Also write results to this file
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Store the run in the results directory
    #[arg(long, global = true)]
    pub save: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the email service API suite
    Api(ApiArgs),

    /// Run the static site suite
    Frontend(FrontendArgs),

    /// Run the API suite, then the static site suite
    All(AllArgs),

    /// Only wait for the API to become healthy
    Wait(WaitArgs),

    /// List scenarios and their default parameters
    List,

    /// View stored runs
    Results(ResultsArgs),

    /// Inspect or create configuration
    Config(ConfigArgs),
}

/// Scenario selection shared by the suite commands
#[derive(ClapArgs, Debug, Default)]
pub struct FilterArgs {
    /// Run only these scenarios (slugs, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these scenarios (slugs, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Arguments for api command
#[derive(ClapArgs, Debug)]
pub struct ApiArgs {
    /// API base URL (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Do not wait for the health endpoint first
    #[arg(long)]
    pub no_wait: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for frontend command
#[derive(ClapArgs, Debug)]
pub struct FrontendArgs {
    /// Static site base URL (overrides STATIC_FILES_URL)
    #[arg(long)]
    pub static_files_url: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for all command
#[derive(ClapArgs, Debug)]
pub struct AllArgs {
    /// API base URL (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Static site base URL (overrides STATIC_FILES_URL)
    #[arg(long)]
    pub static_files_url: Option<String>,

    /// Accept invalid TLS certificates on the static site
    #[arg(long)]
    pub insecure: bool,

    /// Do not wait for the API health endpoint first
    #[arg(long)]
    pub no_wait: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for wait command
#[derive(ClapArgs, Debug)]
pub struct WaitArgs {
    /// API base URL (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the number of polls
    #[arg(long)]
    pub attempts: Option<u32>,
}

/// Arguments for results command
#[derive(ClapArgs, Debug)]
pub struct ResultsArgs {
    /// Suite to show (api, frontend); both when omitted
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Show only the most recent run
    #[arg(short, long)]
    pub latest: bool,

    /// Export the listed runs to a CSV file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

/// Arguments for config command
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Print as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Write an example configuration file
    Init {
        /// Output file path
        #[arg(default_value = "./email-e2e.yaml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Describe the environment variables
    Env,
}
