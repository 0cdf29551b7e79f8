use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use runtrack::colors::{colored_segments, ColorMetric};
use runtrack::config::EngineConfig;
use runtrack::editing::{cut, merge, repair_gps_outliers, trim_to_range};
use runtrack::elevation::elevation_stats;
use runtrack::export::{self, json::read_track, ExportFormat};
use runtrack::logging::{init_logging, LogConfig, LogFormat};
use runtrack::pauses::{find_pauses, moving_duration_ms};
use runtrack::power::with_estimated_power;
use runtrack::query::{pace_min_per_km, point_at_distance, point_at_time, smoothed_pace_with};
use runtrack::segment::segment_stats;
use runtrack::zones::HrZoneCalculator;
use runtrack::{Track, TrackPoint};

/// runtrack - GPS track analysis and editing
///
/// Reads tracks stored as JSON, queries them by distance or elapsed time,
/// computes segment statistics and derived signals, and writes edited tracks.
#[derive(Parser)]
#[command(name = "runtrack")]
#[command(version)]
#[command(about = "GPS track analysis and editing", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of log output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format (pretty, json, compact)
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Also write JSON logs to this file, rotated daily
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show distance, duration, moving time and climbing
    Summary {
        file: PathBuf,
    },

    /// Look up the interpolated point at a distance or elapsed time
    Query {
        file: PathBuf,

        /// Distance from the start in kilometers
        #[arg(long, conflicts_with = "seconds", required_unless_present = "seconds")]
        km: Option<f64>,

        /// Elapsed time from the start in seconds
        #[arg(long)]
        seconds: Option<f64>,
    },

    /// Statistics for a distance range
    Stats {
        file: PathBuf,

        #[arg(long, default_value = "0")]
        from: f64,

        /// Range end in km (defaults to the end of the track)
        #[arg(long)]
        to: Option<f64>,
    },

    /// List detected pauses
    Pauses {
        file: PathBuf,
    },

    /// Remove a distance range and splice the remainder
    Cut {
        file: PathBuf,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Keep only a distance range, re-based to zero
    Trim {
        file: PathBuf,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Concatenate tracks in start-time order
    Merge {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Correct implausible GPS jumps
    Repair {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Attach estimated running power to every point
    Power {
        file: PathBuf,

        /// Runner weight in kg (defaults to the configured weight)
        #[arg(long)]
        weight: Option<f64>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Per-leg colors for a metric
    Colors {
        file: PathBuf,

        /// pace, speed, elevation, hr, power or zone
        #[arg(short, long, default_value = "pace")]
        metric: ColorMetric,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write a track as JSON or CSV
    Export {
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// json or csv (guessed from the output extension if not specified)
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default().with_verbosity(cli.verbose);
    log_config.format = cli.log_format;
    log_config.file_path = cli.log_file.clone();
    init_logging(&log_config)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => EngineConfig::load_or_default(),
    };

    if let Err(e) = run(cli.command, &config) {
        if let Some(track_error) = e.downcast_ref::<runtrack::TrackError>() {
            tracing::error!(severity = ?track_error.severity(), error = %track_error, "Command failed");
            eprintln!("{} {}", "✗".red().bold(), track_error.user_message());
            std::process::exit(1);
        }
        return Err(e);
    }

    Ok(())
}

fn run(command: Commands, config: &EngineConfig) -> Result<()> {
    match command {
        Commands::Summary { file } => {
            let track = load(&file)?;
            print_summary(&track, config);
        }

        Commands::Query { file, km, seconds } => {
            let track = load(&file)?;
            let (point, pace) = match (km, seconds) {
                (Some(km), _) => {
                    let pace = smoothed_pace_with(&track, km, config.query.pace_lookback_m, &config.query);
                    (point_at_distance(&track, km), pace)
                }
                (None, Some(secs)) => match point_at_time(&track, (secs * 1000.0).round() as i64) {
                    Some(timed) => (Some(timed.point), timed.pace),
                    None => (None, 0.0),
                },
                (None, None) => anyhow::bail!("Either --km or --seconds is required"),
            };
            match point {
                Some(point) => print_point(&track, &point, pace),
                None => println!("{}", "No point at that position".yellow()),
            }
        }

        Commands::Stats { file, from, to } => {
            let track = load(&file)?;
            let to = to.unwrap_or(track.distance_km());
            match segment_stats(&track, from, to) {
                Some(stats) => {
                    let rows = vec![
                        row("Distance", format!("{:.2} km", stats.distance_km)),
                        row("Duration", format_duration(stats.duration_ms)),
                        row("Avg pace", format_pace(stats.avg_pace)),
                        row("Fastest pace", opt(stats.min_pace.map(format_pace))),
                        row("Slowest pace", opt(stats.max_pace.map(format_pace))),
                        row("Elevation gain", format!("{:.0} m", stats.elevation_gain)),
                        row("Elevation loss", format!("{:.0} m", stats.elevation_loss)),
                        row(
                            "Elevation range",
                            format!("{:.0} - {:.0} m", stats.min_elevation, stats.max_elevation),
                        ),
                        row("Avg HR", opt(stats.avg_hr.map(|v| format!("{:.0} bpm", v)))),
                        row("Max HR", opt(stats.max_hr.map(|v| format!("{:.0} bpm", v)))),
                        row("Avg power", opt(stats.avg_power.map(|v| format!("{:.0} W", v)))),
                        row("Avg cadence", opt(stats.avg_cadence.map(|v| format!("{:.0} spm", v)))),
                    ];
                    println!("{}", format!("{:.2} - {:.2} km", from, to).blue().bold());
                    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
                }
                None => println!("{}", "Range contains fewer than 2 points".yellow()),
            }
        }

        Commands::Pauses { file } => {
            let track = load(&file)?;
            let pauses = find_pauses(&track, &config.pauses);
            if pauses.is_empty() {
                println!("{}", "No pauses detected".green());
                return Ok(());
            }

            #[derive(Tabled)]
            struct PauseRow {
                #[tabled(rename = "#")]
                n: usize,
                #[tabled(rename = "At")]
                at: String,
                #[tabled(rename = "Starts")]
                starts: String,
                #[tabled(rename = "Duration")]
                duration: String,
            }

            let rows: Vec<PauseRow> = pauses
                .iter()
                .enumerate()
                .map(|(i, p)| PauseRow {
                    n: i + 1,
                    at: format!("{:.2} km", p.start.cumulative_distance()),
                    starts: track
                        .first()
                        .map(|first| format_duration(p.start.millis_since(first)))
                        .unwrap_or_default(),
                    duration: format_duration(p.duration_ms),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()).to_string());
        }

        Commands::Cut { file, from, to, output } => {
            let track = load(&file)?;
            let edited = cut(&track, from, to);
            save(&edited, &output)?;
            report_edit(&track, &edited, &output);
        }

        Commands::Trim { file, from, to, output } => {
            let track = load(&file)?;
            let edited = trim_to_range(&track, from, to);
            save(&edited, &output)?;
            report_edit(&track, &edited, &output);
        }

        Commands::Merge { files, output } => {
            let tracks = files.iter().map(|f| load(f)).collect::<Result<Vec<_>>>()?;
            let merged = merge(&tracks);
            save(&merged, &output)?;
            println!(
                "{} Merged {} tracks into \"{}\" ({:.2} km)",
                "✓".green(),
                tracks.len(),
                merged.name(),
                merged.distance_km()
            );
        }

        Commands::Repair { file, output } => {
            let track = load(&file)?;
            let result = repair_gps_outliers(&track, &config.repair);
            save(&result.track, &output)?;
            println!(
                "{} Corrected {} point(s); {:.2} km -> {:.2} km",
                "✓".green(),
                result.corrected_count,
                track.distance_km(),
                result.track.distance_km()
            );
        }

        Commands::Power { file, weight, output } => {
            let track = load(&file)?;
            let weight = weight.unwrap_or(config.power.weight_kg);
            let powered = with_estimated_power(&track, weight, &config.power);
            save(&powered, &output)?;
            let avg = segment_stats(&powered, 0.0, powered.distance_km()).and_then(|s| s.avg_power);
            println!(
                "{} Estimated power at {:.1} kg, average {}",
                "✓".green(),
                weight,
                opt(avg.map(|w| format!("{:.0} W", w)))
            );
        }

        Commands::Colors { file, metric, json } => {
            let track = load(&file)?;
            let zones = HrZoneCalculator::new(&config.zones)?;
            let segments = colored_segments(&track, metric, &zones);
            if json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
                return Ok(());
            }

            #[derive(Tabled)]
            struct ColorRow {
                #[tabled(rename = "Leg")]
                leg: String,
                #[tabled(rename = "Value")]
                value: String,
                #[tabled(rename = "Color")]
                color: String,
            }

            let rows: Vec<ColorRow> = segments
                .iter()
                .map(|s| ColorRow {
                    leg: format!("{}-{}", s.start_index, s.end_index),
                    value: opt(s.value.map(|v| format!("{:.2}", v))),
                    color: s.color.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()).to_string());
        }

        Commands::Export { file, output, format } => {
            let track = load(&file)?;
            let format = format
                .or_else(|| ExportFormat::from_path(&output))
                .unwrap_or(ExportFormat::Json);
            export::export_track(&track, format, &output)?;
            println!("{} Wrote {}", "✓".green(), output.display());
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Track> {
    Ok(read_track(path)?)
}

fn save(track: &Track, path: &Path) -> Result<()> {
    export::json::write_track(track, path)
        .with_context(|| format!("Failed to write track: {}", path.display()))
}

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Metric")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(key: &'static str, value: String) -> KeyValue {
    KeyValue { key, value }
}

fn opt(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn format_duration(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let (h, m, s) = (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

fn format_pace(min_per_km: f64) -> String {
    if min_per_km <= 0.0 || !min_per_km.is_finite() {
        return "-".to_string();
    }
    let total_secs = (min_per_km * 60.0).round() as i64;
    format!("{}:{:02} /km", total_secs / 60, total_secs % 60)
}

fn print_summary(track: &Track, config: &EngineConfig) {
    let elevation = elevation_stats(track.points(), config.elevation.threshold_m);
    let pauses = find_pauses(track, &config.pauses);
    let moving_ms = moving_duration_ms(track, &config.pauses);

    let rows = vec![
        row("Points", track.len().to_string()),
        row("Distance", format!("{:.2} km", track.distance_km())),
        row("Duration", format_duration(track.duration_ms())),
        row("Moving time", format_duration(moving_ms)),
        row("Pauses", pauses.len().to_string()),
        row(
            "Avg pace",
            format_pace(pace_min_per_km(moving_ms, track.distance_km())),
        ),
        row("Elevation gain", format!("{:.0} m", elevation.gain)),
        row("Elevation loss", format!("{:.0} m", elevation.loss)),
    ];

    println!("{}", track.name().green().bold());
    println!("{}", format!("{}  {}", track.id(), track.color()).dimmed());
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
}

fn print_point(track: &Track, point: &TrackPoint, pace: f64) {
    let elapsed = track
        .first()
        .map(|first| format_duration(point.millis_since(first)))
        .unwrap_or_default();
    let rows = vec![
        row("Distance", format!("{:.3} km", point.cumulative_distance())),
        row("Elapsed", elapsed),
        row("Position", format!("{:.6}, {:.6}", point.lat, point.lon)),
        row("Elevation", format!("{:.1} m", point.ele)),
        row("Pace", format_pace(pace)),
        row("HR", opt(point.hr.map(|v| format!("{:.0} bpm", v)))),
        row("Cadence", opt(point.cad.map(|v| format!("{:.0} spm", v)))),
        row("Power", opt(point.power.map(|v| format!("{:.0} W", v)))),
    ];
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
}

fn report_edit(before: &Track, after: &Track, output: &Path) {
    if before.id() == after.id() {
        println!("{}", "Range selected nothing to change; wrote the track unchanged".yellow());
    }
    println!(
        "{} {} -> {}: {} points, {:.2} km, {}",
        "✓".green(),
        before.name(),
        output.display(),
        after.len(),
        after.distance_km(),
        format_duration(after.duration_ms())
    );
}
