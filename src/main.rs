//! memsweep - memory-sweep load testing for remotely invocable functions

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use memsweep_adapters::HttpAdapter;
use memsweep_core::{RunConfig, RunEvent, SweepRunnerBuilder};
use std::sync::Arc;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Run {
            config,
            endpoint,
            json,
        } => run(&config, endpoint, json).await,
        Commands::Validate { config } => validate(&config),
    }
}

fn load_config(path: &str) -> Result<RunConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {path}"))?;
    let config: RunConfig =
        serde_json::from_str(&raw).with_context(|| format!("malformed configuration in {path}"))?;
    config.validate()?;
    Ok(config)
}

fn validate(path: &str) -> Result<()> {
    let config = load_config(path)?;
    println!(
        "ok: {} steps, {} repeats, concurrency {}",
        config.resource_steps.len(),
        config.repeats,
        config.concurrency
    );
    Ok(())
}

async fn run(config_path: &str, endpoint: String, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let adapter = Arc::new(HttpAdapter::new(endpoint));

    let (runner, mut events_rx) = SweepRunnerBuilder::new()
        .config(config)
        .adapter(adapter)
        .build()?;

    let total_invocations =
        runner.config().resource_steps.len() as u64 * runner.config().repeats as u64;

    // Drive the progress bar off the live event stream
    let progress = tokio::spawn(async move {
        let pb = ProgressBar::new(total_invocations);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style.progress_chars("#>-"));

        while let Some(event) = events_rx.recv().await {
            match event {
                RunEvent::Start { original_memory_mb } => {
                    pb.set_message(format!("original: {original_memory_mb} MB"));
                }
                RunEvent::Step { memory_mb } => {
                    pb.set_message(format!("{memory_mb} MB"));
                }
                RunEvent::Warmup => {}
                RunEvent::Invoke { .. } => pb.inc(1),
                RunEvent::StepResult { memory_mb, report } => {
                    tracing::info!(memory_mb, avg_ms = report.avg, "step complete");
                }
                RunEvent::Finish => pb.finish_and_clear(),
            }
        }
    });

    let result = runner.run().await;

    // Dropping the runner closes the event channel and ends the progress task
    drop(runner);
    let _ = progress.await;

    match result {
        Ok(report) => {
            if json {
                println!("{}", memsweep_report::render_json(&report)?);
            } else {
                print!("{}", memsweep_report::render_table(&report));
                if let Some(best) = report.fastest() {
                    println!(
                        "\nfastest: {} MB (avg {} ms)",
                        best.memory_mb, best.report.avg
                    );
                }
            }
            Ok(())
        }
        Err(err) => {
            if !err.partial.is_empty() {
                eprintln!("completed steps before failure:");
                eprint!("{}", memsweep_report::render_table(&err.partial));
            }
            Err(err.into())
        }
    }
}
