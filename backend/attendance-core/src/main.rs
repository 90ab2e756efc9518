// src/main.rs

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use attendance_core::cli::{Cli, Command, GenerationArgs};
use attendance_core::report::{progress_text, summary_text, template_text, write_entries_csv};
use attendance_core::exceptions::ExceptionInterval;
use attendance_core::{
    ApiClient, AppConfig, BambooApi, BambooEndpoints, BatchOrchestrator, FillRequest, KenjoApi,
    KenjoEndpoints, LoggingObserver, RngJitter, SyncEvent, SyncObserver, SyncOrchestrator,
};

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("Setting tracing subscriber failed")
}

/// Prints write progress on stderr and forwards everything to tracing.
fn console_observer(event: SyncEvent) {
    if let SyncEvent::Progress { completed, total } = &event {
        eprintln!("{}", progress_text(*completed, *total));
    }
    LoggingObserver.notify(event);
}

fn orchestrator(
    config: &AppConfig,
    seed: Option<u64>,
) -> Result<SyncOrchestrator<KenjoApi, RngJitter<rand::rngs::StdRng>>> {
    let client = ApiClient::new(config.client_config()).context("Creating HTTP client failed")?;
    let endpoints = KenjoEndpoints::new(&config.api_url).context("Invalid API URL")?;
    let jitter = match seed {
        Some(seed) => RngJitter::seeded(seed),
        None => RngJitter::from_entropy(),
    };
    Ok(SyncOrchestrator::new(KenjoApi::new(client, endpoints), jitter))
}

fn bamboo_orchestrator(
    config: &AppConfig,
    seed: Option<u64>,
) -> Result<BatchOrchestrator<BambooApi, RngJitter<rand::rngs::StdRng>>> {
    let settings = config.bamboo_settings()?;
    let client = ApiClient::new(config.client_config()).context("Creating HTTP client failed")?;
    let endpoints = BambooEndpoints::new(&settings.url).context("Invalid BambooHR URL")?;
    let jitter = match seed {
        Some(seed) => RngJitter::seeded(seed),
        None => RngJitter::from_entropy(),
    };
    let api = BambooApi::new(client, endpoints, settings.csrf_token, settings.employee_id);
    Ok(BatchOrchestrator::new(api, jitter))
}

fn fill_request(
    config: &AppConfig,
    generation: &GenerationArgs,
    range: attendance_core::DateRange,
) -> Result<FillRequest> {
    let mut config = config.clone();
    if let Some(path) = &generation.template {
        config.template_path = Some(path.clone());
    }
    let template = config.load_template()?;
    Ok(FillRequest {
        template,
        entropy_minutes: generation.entropy.unwrap_or(config.entropy_minutes),
        range,
    })
}

fn write_csv(path: &Path, entries: &[attendance_core::EntryDescriptor]) -> Result<()> {
    if path == Path::new("-") {
        write_entries_csv(io::stdout().lock(), entries).context("Writing CSV to stdout failed")?;
    } else {
        let file = File::create(path)
            .with_context(|| format!("Creating CSV file {} failed", path.display()))?;
        write_entries_csv(file, entries)
            .with_context(|| format!("Writing CSV file {} failed", path.display()))?;
        info!("Wrote {} planned entries to {}", entries.len(), path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = AppConfig::from_env().context("Loading configuration failed")?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Fill { range, generation } => {
            let range = range.resolve(today)?;
            let request = fill_request(&config, &generation, range)?;
            let mut sync = orchestrator(&config, generation.seed)?;

            let outcome = sync
                .run_fill_range(&request, &mut console_observer)
                .await
                .context("Filling attendance failed")?;
            println!("{}", summary_text(outcome.created, &outcome.skipped));
        }
        Command::Plan {
            range,
            generation,
            csv,
        } => {
            let range = range.resolve(today)?;
            let request = fill_request(&config, &generation, range)?;
            let mut sync = orchestrator(&config, generation.seed)?;

            let planned = sync
                .plan_fill_range(&request, &mut console_observer)
                .await
                .context("Planning attendance failed")?;

            let summary = summary_text(planned.entries.len(), &planned.skipped);
            match csv {
                Some(path) => {
                    write_csv(&path, &planned.entries)?;
                    // Keep stdout pure CSV when it is the target
                    eprintln!("{}", summary);
                }
                None => {
                    for entry in &planned.entries {
                        println!(
                            "{} {}-{} (break {} min)",
                            entry.date,
                            entry.start_clock_time(),
                            entry.end_clock_time(),
                            entry.break_minutes
                        );
                    }
                    println!("{}", summary);
                }
            }
        }
        Command::Delete { range, yes } => {
            let range = range.resolve(today)?;
            if !yes {
                bail!("Refusing to delete entries in {} without --yes", range);
            }
            let mut sync = orchestrator(&config, None)?;

            let outcome = sync
                .run_delete_range(&range, &mut console_observer)
                .await
                .context("Deleting attendance failed")?;
            println!("Deleted {} entries.", outcome.deleted);
        }
        Command::BambooFill {
            range,
            generation,
            days_off,
        } => {
            let range = range.resolve(today)?;
            let request = fill_request(&config, &generation, range)?;
            let days_off: Vec<ExceptionInterval> = days_off.iter().map(|d| d.interval()).collect();
            let mut sync = bamboo_orchestrator(&config, generation.seed)?;

            let outcome = sync
                .run_fill_range(&request, &days_off, &mut console_observer)
                .await
                .context("Filling BambooHR timesheet failed")?;
            println!("{}", summary_text(outcome.created, &outcome.skipped));
        }
        Command::BambooDay {
            date,
            slots,
            template,
        } => {
            let mut config = config;
            if let Some(path) = template {
                config.template_path = Some(path);
            }
            let template = config.load_template()?;
            let date = date.unwrap_or(today);
            let mut sync = bamboo_orchestrator(&config, None)?;

            let outcome = sync
                .run_fill_day(&template, slots, date, &mut console_observer)
                .await
                .context("Filling BambooHR timesheet failed")?;
            println!("Created {} entries for {}.", outcome.created, date);
        }
        Command::Template { template } => {
            let mut config = config;
            if let Some(path) = template {
                config.template_path = Some(path);
            }
            let template = config.load_template()?;
            println!("{}", template_text(&template)?);
            // Built-in week doubles as a starting point for a template file
            if config.template_path.is_none() {
                println!(
                    "\n{}",
                    serde_json::to_string_pretty(&template).context("Rendering template failed")?
                );
            }
        }
    }

    Ok(())
}
