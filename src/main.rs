// Entry point for the `capacity` command.
//
// Loads the capacity export (the configured default file, or `--file`),
// applies the date/facility filter and prints the dashboard as markdown
// tables. A missing or empty export is not an error: the dashboard is empty.
use bed_capacity::config::AppConfig;
use bed_capacity::error::{AppError, LoadError};
use bed_capacity::loader::{self, Acquisition};
use bed_capacity::schema::REFERENCE_SCHEMA;
use bed_capacity::store::IngestOutcome;
use bed_capacity::util::format_int;
use bed_capacity::{output, telemetry, Dashboard, FacilityFilter, RecordParser};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "capacity",
    about = "Summarize hospital bed-capacity exports: KPIs, watchlist and a 7-day ICU forecast",
    version
)]
struct Cli {
    /// Capacity export to load instead of the configured default
    #[arg(long, short)]
    file: Option<PathBuf>,
    /// Facility name, or `all`
    #[arg(long, default_value = "all")]
    facility: FacilityFilter,
    /// First report date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,
    /// Last report date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,
    /// Rows shown per preview table
    #[arg(long, default_value_t = 10)]
    preview: usize,
    /// Write table.csv, watchlist.csv and dashboard.json to the output directory
    #[arg(long)]
    export: bool,
    /// Print the full view as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    let parser = RecordParser::new(REFERENCE_SCHEMA.clone()).map_err(LoadError::from)?;
    let source = cli.file.clone().unwrap_or_else(|| config.data_file.clone());

    let mut dashboard = Dashboard::new(config.table_limit);
    let acquisition = loader::acquire_file(&parser, &source);
    if let Acquisition::Loaded { load_report, .. } = &acquisition {
        println!(
            "Processing dataset... ({} rows read, {} usable)",
            format_int(load_report.total_rows),
            format_int(load_report.accepted_rows)
        );
        if load_report.rejected_rows > 0 {
            println!(
                "Note: {} rows skipped (too few columns or no report date).",
                format_int(load_report.rejected_rows)
            );
        }
    }
    if let IngestOutcome::Empty = dashboard.ingest(acquisition) {
        println!("No capacity data available from {}.", source.display());
        return Ok(());
    }

    let store = dashboard.store();
    if let FacilityFilter::Named(name) = &cli.facility {
        if !store.facilities().iter().any(|f| f == name) {
            return Err(AppError::Filter(format!(
                "unknown facility '{}'; {} facilities loaded",
                name,
                store.facilities().len()
            )));
        }
    }

    let mut criteria = dashboard.default_criteria();
    criteria.facility = cli.facility.clone();
    if cli.from.is_some() {
        criteria.date_from = cli.from;
    }
    if cli.to.is_some() {
        criteria.date_to = cli.to;
    }
    if let (Some(from), Some(to)) = (criteria.date_from, criteria.date_to) {
        if from > to {
            return Err(AppError::Filter(format!("--from {from} is after --to {to}")));
        }
    }

    let Some(view) = dashboard.view(&criteria) else {
        return Ok(());
    };
    info!(generation = view.generation, matched = view.matched, "dashboard ready");

    if cli.json {
        let s = serde_json::to_string_pretty(&view).map_err(|e| AppError::Export(e.into()))?;
        println!("{}", s);
    } else {
        output::print_dashboard(&view, cli.preview);
    }

    if cli.export {
        let written =
            output::export_dashboard(&config.output_dir, &view).map_err(AppError::Export)?;
        for path in written {
            println!("Exported {}", path);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", AppError::from(e));
            return ExitCode::from(2);
        }
    };
    if let Err(e) = telemetry::init(&config.telemetry) {
        eprintln!("{}", AppError::from(e));
        return ExitCode::from(2);
    }

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "capacity run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
