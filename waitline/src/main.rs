//! wl - waitline simulator
//!
//! CLI entry point for exercising the admission queue in-process.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use waitline::cli::{Cli, Command, OutputFormat};
use waitline::config::Config;
use waitline::simulation::{self, Round, SimulationOptions};
use waitline::status::Status;

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to stderr so stdout stays clean for results
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to init tracing: {}", e))?;

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Simulate {
            participants,
            window,
            ticks,
            leave_every,
            interval_ms,
            format,
        } => {
            let mut queue = config.queue;
            if let Some(window) = window {
                queue.admission_window = window;
            }
            if let Some(interval_ms) = interval_ms {
                queue.recalibrator.tick_interval_ms = interval_ms;
            }
            let admission_window = queue.admission_window;

            let options = SimulationOptions {
                participants,
                ticks,
                leave_every,
            };
            let rounds = simulation::run(queue, &options).await.context("Simulation failed")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rounds)?),
                OutputFormat::Text => print_rounds(&rounds, participants, admission_window),
            }
        }
        Command::StatusOf { rank, window } => {
            let status = Status::for_rank(rank, window);
            println!("{}", status);
        }
    }

    Ok(())
}

fn print_rounds(rounds: &[Round], participants: usize, admission_window: usize) {
    println!(
        "{} participants, admission window {}",
        participants.to_string().cyan(),
        admission_window.to_string().cyan()
    );

    for round in rounds {
        println!(
            "\n{} {}  live={} dropped={} delivered={} skipped={}",
            "tick".bold(),
            round.report.tick.to_string().bold(),
            round.report.live,
            round.report.dropped,
            round.report.delivered,
            round.report.skipped
        );

        for observation in &round.participants {
            let label = match observation.status {
                _ if observation.removed => "left".dimmed(),
                Some(status) if status.is_admitted() => "admitted".green(),
                Some(status) => format!("waiting ({})", status).yellow(),
                None => "no status yet".dimmed(),
            };
            println!("  #{:<4} {}", observation.index, label);
        }
    }
}
