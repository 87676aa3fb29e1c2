use std::io::{self, Write};

use anyhow::{Context, bail};
use clap::Parser;
use cli::{Cli, Command, ExportArgs, ViewArgs};

use meteomarine_service::analysis::groupings::{filter_by_date_range, filter_by_station};
use meteomarine_service::config::Config;
use meteomarine_service::export::write_csv;
use meteomarine_service::ingest::api::WeatherApi;
use meteomarine_service::logging::{self, DataSource};
use meteomarine_service::stations::StationFilter;
use meteomarine_service::verify::{self, VerificationStatus};
use meteomarine_service::view::{Dashboard, View, ViewOptions};

mod cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init_logger(args.log_level, args.log_file.as_deref());

    let config = Config::load(args.config.as_deref()).context("loading configuration")?;
    logging::debug(
        DataSource::Config,
        None,
        &format!("API {} (limit {:?})", config.api_base_url, config.observation_limit),
    );

    match args.cmd {
        Command::View(view_args) => run_view(config, view_args),
        Command::Export(export_args) => run_export(config, export_args),
        Command::Verify => run_verify(config),
    }
}

fn station_filter(raw: Option<&str>) -> StationFilter {
    raw.map(StationFilter::parse).unwrap_or_default()
}

fn run_view(mut config: Config, args: ViewArgs) -> anyhow::Result<()> {
    if let Some(limit) = args.limit {
        config.observation_limit = (limit > 0).then_some(limit);
    }
    let api = WeatherApi::new(config).context("building HTTP client")?;

    let view = View::route(&args.path);
    let dashboard = Dashboard::start(api);

    let options = ViewOptions {
        station: station_filter(args.station.as_deref()),
        only_alerts: args.only_alerts,
        with_risk: args.with_risk,
    };
    let mut session = dashboard.open(view, options);
    session.wait();

    write!(io::stdout().lock(), "{}", session.render(&args.path))?;

    if session.is_failed() {
        bail!("{} failed to load", view);
    }
    Ok(())
}

fn run_export(config: Config, args: ExportArgs) -> anyhow::Result<()> {
    let limit = args.limit.filter(|n| *n > 0);
    let api = WeatherApi::new(config).context("building HTTP client")?;
    let records = api.observations(limit).context("fetching observations")?;

    let filter = station_filter(args.station.as_deref());
    let mut selected = filter_by_station(&records, &filter);
    if args.from.is_some() || args.to.is_some() {
        selected = filter_by_date_range(&selected, args.from, args.to);
    }

    let written = write_csv(&selected, io::stdout().lock()).context("writing CSV")?;
    logging::info(
        DataSource::Observations,
        None,
        &format!("Exported {} of {} records", written, records.len()),
    );
    Ok(())
}

fn run_verify(config: Config) -> anyhow::Result<()> {
    let api = WeatherApi::new(config).context("building HTTP client")?;
    let report = verify::run_full_verification(&api);

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report).context("writing report")?;
    writeln!(out)?;
    verify::print_summary(&report, &mut io::stderr().lock())?;

    if report.summary.overall == VerificationStatus::Failed {
        bail!("weather API verification failed");
    }
    Ok(())
}
