//! email-e2e - end-to-end checks for the email service
//!
//! A CLI harness that waits for the email service API to report healthy,
//! then exercises its health and login endpoints and the CDN-fronted static
//! site that serves its frontend.
//!
//! ## Features
//!
//! - Readiness gate on `GET /api/health` (30 polls, 2s apart)
//! - Retrying HTTP clients per suite (429/5xx for the API, connection errors for the site)
//! - Login validation over a list of valid and malformed emails
//! - Cache-Control and CDN provenance checks on the static site
//! - Multiple output formats (Table, JSON, CSV) and stored run history
//!
//! ## Usage
//!
//! ```bash
//! # Run the API suite against BASE_URL
//! BASE_URL=http://localhost:8080 email-e2e api
//!
//! # Run the static site suite, accepting a self-signed certificate
//! email-e2e frontend --static-files-url https://localhost --insecure
//!
//! # Run both suites and store the results
//! email-e2e all --save --format json
//!
//! # Only wait for the service to come up
//! email-e2e wait
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use tracing::{error, info};

mod cli;
mod config;
mod executor;
mod http;
mod models;
mod output;
mod readiness;
mod results;
mod scenarios;
#[cfg(test)]
mod testing;
mod utils;

use cli::{Args, Command, FilterArgs};
use config::{EnvConfig, HarnessConfig};
use executor::{CaseFilter, RunError, SuiteRunner};
use http::HttpClient;
use models::{Scenario, Suite};
use output::{OutputFormat, ResultFormatter};
use readiness::ReadinessGate;
use results::{ResultsStorage, StoredRun};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(LogLevel::from_verbose(args.verbose));

    let env = EnvConfig::load();
    let mut config = HarnessConfig::resolve(args.config.as_deref(), &env)?;
    if let Some(format) = &args.format {
        config.output.format = format.clone();
    }
    if args.no_color {
        config.output.color = false;
    }

    let success = match &args.command {
        Command::Api(api) => {
            if let Some(url) = &api.base_url {
                config.api.base_url = url.clone();
            }
            if api.no_wait {
                config.api.wait_for_ready = false;
            }
            config.validate()?;

            let run = run_api(&config, &api.filter).await?;
            report(&args, &config, &[run])?
        }
        Command::Frontend(frontend) => {
            if let Some(url) = &frontend.static_files_url {
                config.frontend.static_files_url = url.clone();
            }
            if frontend.insecure {
                config.frontend.tls_insecure = true;
            }
            config.validate()?;

            let run = run_frontend(&config, &frontend.filter).await?;
            report(&args, &config, &[run])?
        }
        Command::All(all) => {
            if let Some(url) = &all.base_url {
                config.api.base_url = url.clone();
            }
            if let Some(url) = &all.static_files_url {
                config.frontend.static_files_url = url.clone();
            }
            if all.insecure {
                config.frontend.tls_insecure = true;
            }
            if all.no_wait {
                config.api.wait_for_ready = false;
            }
            config.validate()?;

            run_all(&args, &config, &all.filter).await?
        }
        Command::Wait(wait) => {
            if let Some(url) = &wait.base_url {
                config.api.base_url = url.clone();
            }
            if let Some(attempts) = wait.attempts {
                config.api.readiness.max_attempts = attempts;
            }
            config.validate()?;

            wait_for_api(&config).await?;
            true
        }
        Command::List => {
            list_scenarios(&config);
            true
        }
        Command::Results(results_args) => {
            show_results(results_args)?;
            true
        }
        Command::Config(config_args) => {
            manage_config(config_args, &config, &env)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

fn case_filter(filter: &FilterArgs) -> Result<CaseFilter> {
    Ok(CaseFilter::parse(&filter.only, &filter.skip)?)
}

async fn run_suite(runner: SuiteRunner) -> Result<StoredRun, RunError> {
    let started_at = Utc::now();
    let summary = runner.run().await?;
    Ok(StoredRun::new(started_at, summary))
}

async fn run_api(config: &HarnessConfig, filter: &FilterArgs) -> Result<StoredRun> {
    let runner = SuiteRunner::api(&config.api)?.with_filter(case_filter(filter)?);
    run_suite(runner)
        .await
        .with_context(|| format!("API suite against {} aborted", config.api.base_url))
}

async fn run_frontend(config: &HarnessConfig, filter: &FilterArgs) -> Result<StoredRun> {
    let runner = SuiteRunner::frontend(&config.frontend)?.with_filter(case_filter(filter)?);
    run_suite(runner).await.with_context(|| {
        format!(
            "frontend suite against {} aborted",
            config.frontend.static_files_url
        )
    })
}

/// API suite, then the static site suite; an unready API does not stop the site checks
async fn run_all(args: &Args, config: &HarnessConfig, filter: &FilterArgs) -> Result<bool> {
    let mut runs = Vec::new();
    let mut aborted = false;

    match run_api(config, filter).await {
        Ok(run) => runs.push(run),
        Err(e) => {
            error!("{:#}", e);
            aborted = true;
        }
    }

    match run_frontend(config, filter).await {
        Ok(run) => runs.push(run),
        Err(e) => {
            error!("{:#}", e);
            aborted = true;
        }
    }

    let success = report(args, config, &runs)?;
    Ok(success && !aborted)
}

async fn wait_for_api(config: &HarnessConfig) -> Result<()> {
    let client = HttpClient::new(config.api.retry.clone())?;
    let gate = ReadinessGate::new(config.api.readiness.clone());

    let ready = gate.wait(&client, &config.api.base_url).await?;
    println!(
        "✓ {} is ready (attempt {}, {:.1}s)",
        config.api.base_url,
        ready.attempts,
        ready.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Print, write and store the runs; true when every executed case passed
fn report(args: &Args, config: &HarnessConfig, runs: &[StoredRun]) -> Result<bool> {
    let format = OutputFormat::from_str(&config.output.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", config.output.format))?;
    let mut formatter = ResultFormatter::new(format);
    if !config.output.color {
        formatter = formatter.no_color();
    }

    let summaries: Vec<_> = runs.iter().map(|run| run.summary.clone()).collect();
    println!("{}", formatter.format_summaries(&summaries)?);

    if let Some(path) = &args.output {
        output::write_results_to_file(path, &summaries, format)?;
        info!("Results written to {}", path);
    }

    if args.save {
        let storage = ResultsStorage::default_dir();
        for run in runs {
            storage.save(run)?;
        }
    }

    for summary in &summaries {
        for failure in summary.failures() {
            error!(
                "{} [{}]: {}",
                summary.suite,
                failure.label(),
                failure.message.as_deref().unwrap_or("")
            );
        }
    }

    Ok(summaries.iter().all(|s| s.is_success()))
}

fn list_scenarios(config: &HarnessConfig) {
    for suite in Suite::all() {
        let target = match suite {
            Suite::Api => &config.api.base_url,
            Suite::Frontend => &config.frontend.static_files_url,
        };
        println!("\n{} suite ({})", suite, target);
        println!("──────────────────────────────────────────────────────────────────────");

        for scenario in suite.scenarios() {
            println!("  {:15} {}", scenario.slug(), scenario.name());
            if scenario.is_parameterized() {
                let params = match scenario {
                    Scenario::ValidLogin => &config.api.valid_emails,
                    _ => &config.api.invalid_emails,
                };
                print_params(params);
            }
        }
    }
    println!();
}

fn print_params(params: &[String]) {
    for param in params {
        println!("  {:15}   - {:?}", "", param);
    }
}

fn show_results(args: &cli::ResultsArgs) -> Result<()> {
    let storage = ResultsStorage::default_dir();

    let suites = match &args.suite {
        Some(name) => vec![Suite::from_name(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown suite: {name} (api, frontend)"))?],
        None => Suite::all(),
    };

    let mut runs = Vec::new();
    for suite in suites {
        if args.latest {
            runs.extend(storage.latest(suite)?);
        } else {
            runs.extend(storage.list_runs(suite)?);
        }
    }

    if runs.is_empty() {
        println!("\nNo stored results in {}.", storage.base_dir().display());
        println!("   Run a suite with --save to record one.");
        return Ok(());
    }

    println!(
        "\n{:22} {:9} {:>9} {:>7}  {:25} Target",
        "Run", "Suite", "Passed", "Rate", "Started"
    );
    for run in &runs {
        let info = results::RunInfo::from(run);
        println!(
            "{:22} {:9} {:>9} {:>6.1}%  {:25} {}",
            info.id,
            info.suite,
            format!("{}/{}", info.passed, info.total),
            info.pass_rate,
            info.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            info.target
        );
    }

    if let Some(path) = &args.export {
        storage.export_csv(&runs, path)?;
        println!("\n✓ Exported {} run(s) to {}", runs.len(), path.display());
    }

    Ok(())
}

fn manage_config(args: &cli::ConfigArgs, config: &HarnessConfig, env: &EnvConfig) -> Result<()> {
    match &args.action {
        cli::ConfigAction::Show { json } => {
            let output = if *json {
                serde_json::to_string_pretty(config)?
            } else {
                serde_yaml::to_string(config)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Init { path, force } => {
            if Path::new(path).exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            HarnessConfig::example().save(path)?;
            println!("✓ Configuration file created: {}", path.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            if env.has_any() {
                env.print_summary();
            } else {
                println!("No harness variables are set.");
            }
        }
    }

    Ok(())
}
