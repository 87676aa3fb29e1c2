/// Structured logging for the marine weather dashboard
///
/// Provides context-rich logging with data source and station identifiers
/// on top of the `log` facade. Console output goes through `env_logger`
/// (`RUST_LOG` still works); an optional log file receives a timestamped
/// copy of every entry at or above the configured level.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use log::{Level, LevelFilter};

use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// `/donnees` station observations
    Observations,
    /// `/previsions` daily forecasts
    Forecasts,
    Config,
    System,
}

impl DataSource {
    /// `log` target used for entries from this source.
    pub fn target(self) -> &'static str {
        match self {
            DataSource::Observations => "meteomarine::observations",
            DataSource::Forecasts => "meteomarine::forecasts",
            DataSource::Config => "meteomarine::config",
            DataSource::System => "meteomarine::system",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Observations => write!(f, "OBS"),
            DataSource::Forecasts => write!(f, "FCST"),
            DataSource::Config => write!(f, "CFG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - free-tier host asleep or briefly unreachable
    Expected,
    /// Unexpected failure - server error or API format change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a fetch failure.
///
/// The upstream host spins down when idle; timeouts and 502/503/504 while
/// it wakes up are routine. Other server errors, parse failures and shape
/// changes point at a real problem.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err {
        FetchError::HttpStatus(502..=504) => FailureType::Expected,
        FetchError::HttpStatus(_) => FailureType::Unexpected,
        FetchError::Parse(_) | FetchError::UnexpectedShape(_) => FailureType::Unexpected,
        FetchError::Transport(msg) if msg.contains("timed out") => FailureType::Expected,
        FetchError::Transport(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Optional log file shared by all logging calls
static LOG_FILE: Mutex<Option<FileSink>> = Mutex::new(None);

struct FileSink {
    path: String,
    min_level: LevelFilter,
}

impl FileSink {
    fn append(&self, level: Level, entry: &str) {
        if level > self.min_level {
            return;
        }
        if let Err(e) = append_to_file(&self.path, entry) {
            eprintln!("Failed to write to log file {}: {}", self.path, e);
        }
    }
}

fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", entry)?;
    Ok(())
}

/// Initialize console logging and the optional log file.
///
/// `RUST_LOG` takes precedence over `min_level` for console output. Safe to
/// call more than once; later calls only replace the log file settings.
pub fn init_logger(min_level: LevelFilter, log_file: Option<&str>) {
    let _ = env_logger::Builder::new()
        .filter_level(min_level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();

    if let Ok(mut sink) = LOG_FILE.lock() {
        *sink = log_file.map(|path| FileSink {
            path: path.to_string(),
            min_level,
        });
    }
}

/// Format a single entry: `[SOURCE] [station]: message`.
fn format_entry(source: DataSource, station: Option<&str>, message: &str) -> String {
    let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{}{}: {}", source, station_part, message)
}

fn emit(level: Level, source: DataSource, station: Option<&str>, message: &str) {
    let entry = format_entry(source, station, message);
    log::log!(target: source.target(), level, "{}", entry);

    if let Ok(sink) = LOG_FILE.lock() {
        if let Some(sink) = sink.as_ref() {
            let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            sink.append(level, &format!("{} {} {}", timestamp, level, entry));
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, station: Option<&str>, message: &str) {
    emit(Level::Info, source, station, message);
}

/// Log a warning message
pub fn warn(source: DataSource, station: Option<&str>, message: &str) {
    emit(Level::Warn, source, station, message);
}

/// Log an error message
pub fn error(source: DataSource, station: Option<&str>, message: &str) {
    emit(Level::Error, source, station, message);
}

/// Log a debug message
pub fn debug(source: DataSource, station: Option<&str>, message: &str) {
    emit(Level::Debug, source, station, message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification
pub fn log_fetch_failure(source: DataSource, operation: &str, err: &FetchError) {
    let failure_type = classify_fetch_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => warn(source, None, &message),
        FailureType::Unexpected => error(source, None, &message),
        FailureType::Unknown => warn(source, None, &message),
    }
}

/// Log the outcome of a batch load
pub fn log_batch_summary(source: DataSource, records: usize, stale_stations: &[String]) {
    let message = format!("Loaded {} records", records);
    if records == 0 {
        warn(source, None, &format!("{} (empty batch)", message));
    } else {
        info(source, None, &message);
    }
    for station in stale_stations {
        warn(source, Some(station), "latest observation is stale");
    }
}
