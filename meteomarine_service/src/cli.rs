use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "meteomarine", about = "Douala port marine weather dashboard.")]
pub struct Cli {
    /// TOML settings file (defaults to ./meteomarine.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Minimum log level: off, error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,
    /// Append a timestamped copy of every log entry to this file
    #[arg(long, global = true)]
    pub log_file: Option<String>,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one dashboard view, e.g. `/map` or `/live-data`
    View(ViewArgs),
    /// Write observations as CSV to stdout
    Export(ExportArgs),
    /// Check the API endpoints against the station registry
    Verify,
}

#[derive(Debug, Parser)]
pub struct ViewArgs {
    /// Location path of the view
    #[arg(default_value = "/")]
    pub path: String,
    /// Station filter for the live data table, e.g. "SM 2" or "all"
    #[arg(long)]
    pub station: Option<String>,
    /// Alerts view: hide days without an alert
    #[arg(long)]
    pub only_alerts: bool,
    /// Forecast view: hide days without precipitation risk
    #[arg(long)]
    pub with_risk: bool,
    /// Observation limit for the live data fetch (0 lets the API decide)
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[arg(long)]
    pub station: Option<String>,
    /// First day to include (inclusive)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day to include (inclusive)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Observation limit (defaults to the whole batch)
    #[arg(long)]
    pub limit: Option<u32>,
}
