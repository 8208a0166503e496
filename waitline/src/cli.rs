//! CLI argument parsing for wl

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wl")]
#[command(author, version, about = "Admission queue simulator", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register participants and watch their statuses over several ticks
    Simulate {
        /// Number of participants to register
        #[arg(short = 'n', long, default_value = "5")]
        participants: usize,

        /// Admission window (overrides config)
        #[arg(short, long)]
        window: Option<usize>,

        /// Number of ticks to observe
        #[arg(short, long, default_value = "3")]
        ticks: u32,

        /// Every Nth participant leaves after the first tick (0 = nobody)
        #[arg(short, long, default_value = "0")]
        leave_every: usize,

        /// Tick interval in milliseconds (overrides config)
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the status a rank receives for a given admission window
    StatusOf {
        /// 0-based rank in the queue
        #[arg(short, long)]
        rank: usize,

        /// Admission window
        #[arg(short, long)]
        window: usize,
    },
}

/// Output format for simulation results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
