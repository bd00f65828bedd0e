//! tripsplit CLI - split GPS tracking data into foraging trips
//!
//! Usage:
//!   tripsplit-cli split <fixes.csv> [--config <cfg.json>] [--output <dir>]
//!   tripsplit-cli interpolate <fixes.csv> --step-minutes <n> [--types Complete,Incomplete]
//!
//! Input CSV columns: individual_id, timestamp (RFC 3339), longitude, latitude,
//! and optionally origin_longitude, origin_latitude. When no origin columns
//! are present, `--colony <lon,lat>` supplies a shared origin.

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tripsplit::{
    select_trip_types, summarize_interpolated, DistanceMode, Interpolator, LinearInterpolator,
    Location, OriginResolver, PipelineOutput, RawFix, TripConfig, TripError, TripPipeline,
    TripType,
};

#[derive(Parser)]
#[command(name = "tripsplit-cli")]
#[command(about = "Split central-place foraging tracks into classified trips", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment, classify and summarize trips
    Split {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Split trips, then interpolate selected trip types at a fixed step
    Interpolate {
        #[command(flatten)]
        input: InputArgs,

        /// Time step in minutes
        #[arg(long, default_value = "60")]
        step_minutes: i64,

        /// Trip types to interpolate (comma separated)
        #[arg(long, value_delimiter = ',', default_value = "Complete,Incomplete")]
        types: Vec<TripType>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CSV file of fixes
    fixes: PathBuf,

    /// JSON file with a trip configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shared colony as "lon,lat" when fixes carry no origin columns
    #[arg(long, value_parser = parse_location)]
    colony: Option<Location>,

    /// Output directory for CSV results
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Inner buffer in meters
    #[arg(long)]
    inner_buffer: Option<f64>,

    /// Return buffer in meters
    #[arg(long)]
    return_buffer: Option<f64>,

    /// Gap time threshold in hours
    #[arg(long)]
    gap_time: Option<f64>,

    /// Gap distance threshold in meters
    #[arg(long)]
    gap_dist: Option<f64>,

    /// Coordinates are already projected (meters)
    #[arg(long)]
    planar: bool,

    /// Drop non-trip fixes from the classified output
    #[arg(long)]
    trips_only: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let result = match cli.command {
        Commands::Split { input } => run_split(&input).map(|_| ()),
        Commands::Interpolate {
            input,
            step_minutes,
            types,
        } => run_interpolate(&input, step_minutes, &types),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_location(s: &str) -> Result<Location, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'lon,lat', got '{}'", s))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {}", e))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {}", e))?;
    Ok(Location::new(lon, lat))
}

/// Config file first, then command-line overrides.
fn load_config(input: &InputArgs) -> Result<TripConfig, String> {
    let mut config = match &input.config {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
            serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))?
        }
        None => TripConfig::default(),
    };

    if let Some(v) = input.inner_buffer {
        config.inner_buffer_m = v;
    }
    if let Some(v) = input.return_buffer {
        config.return_buffer_m = v;
    }
    if let Some(v) = input.gap_time {
        config.gap_time_hours = v;
    }
    if let Some(v) = input.gap_dist {
        config.gap_dist_m = v;
    }
    if input.planar {
        config.distance_mode = DistanceMode::Planar;
    }
    if input.trips_only {
        config.remove_non_trip = true;
    }
    Ok(config)
}

fn read_fixes(path: &Path) -> Result<Vec<RawFix>, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;
    let mut fixes = Vec::new();
    for (line, record) in reader.deserialize::<RawFix>().enumerate() {
        match record {
            Ok(fix) => fixes.push(fix),
            // Header is line 1
            Err(e) => return Err(format!("{} row {}: {}", path.display(), line + 2, e)),
        }
    }
    info!("Loaded {} fixes from {}", fixes.len(), path.display());
    Ok(fixes)
}

fn write_csv<T: serde::Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let path = dir.join(name);
    let file = File::create(&path).map_err(|e| e.to_string())?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn report_issues(issues: &[TripError]) {
    for issue in issues {
        warn!("{}", issue);
    }
}

fn run_split(input: &InputArgs) -> Result<(PipelineOutput, OriginResolver), String> {
    let config = load_config(input)?;
    let fixes = read_fixes(&input.fixes)?;

    let origins = match input.colony {
        Some(colony) => OriginResolver::shared(colony),
        None => OriginResolver::from_raw_fixes(&fixes),
    };

    let pipeline = TripPipeline::new(config);
    let output = pipeline.run(&fixes, &origins).map_err(|e| e.to_string())?;
    let origins = pipeline
        .output_origins(&origins)
        .map_err(|e| e.to_string())?;

    println!("\n{}", "=".repeat(60));
    println!("{:<12} {:>8}", "Trip type", "Trips");
    println!("{}", "-".repeat(60));
    for trip_type in TripType::ALL {
        println!(
            "{:<12} {:>8}",
            trip_type.as_str(),
            output.summaries_of(trip_type).count()
        );
    }
    println!("{:<12} {:>8}", "Trips", output.trip_count());
    println!("{}", "=".repeat(60));

    report_issues(&output.issues);
    write_csv(&input.output, "classified.csv", &output.fixes)?;
    write_csv(&input.output, "summary.csv", &output.summaries)?;
    Ok((output, origins))
}

fn run_interpolate(input: &InputArgs, step_minutes: i64, types: &[TripType]) -> Result<(), String> {
    let (output, origins) = run_split(input)?;
    let selected = select_trip_types(&output.fixes, types);
    if selected.is_empty() {
        warn!("No trips of types {:?} to interpolate", types);
        return Ok(());
    }

    let mode = load_config(input)?.distance_mode;
    let interpolator = LinearInterpolator::new(origins, mode);
    let interpolated = interpolator
        .interpolate(&selected, chrono::Duration::minutes(step_minutes))
        .map_err(|e| e.to_string())?;

    let report = summarize_interpolated(&interpolated, &output.fixes, mode);
    report_issues(&report.issues);
    write_csv(&input.output, "interpolated.csv", &interpolated)?;
    write_csv(&input.output, "interpolated_summary.csv", &report.summaries)?;
    Ok(())
}
