//! traxis CLI: batch track measurement from saved sessions.

mod report;
mod session;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use traxis::{
    AnalysisConfig, AngleMeasurement, Calibration, DensityMeasurement, TrackAnalyzer,
    TrackMeasurement, TrackPoint,
};

use session::Session;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "traxis")]
#[command(
    about = "Measure charged-particle tracks on bubble-chamber photographs (circle fit, momentum, opening angle, optical density)"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every measurement the session has inputs for and print the reports.
    Measure(CliMeasureArgs),

    /// Fit a circle to a JSON list of markers.
    Fit(CliFitArgs),

    /// Print the default analysis configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliMeasureArgs {
    /// Saved session (JSON) with markers, dL and reference line.
    #[arg(long)]
    session: PathBuf,

    /// Analysis configuration (JSON); defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Photograph to integrate over, overriding the session's image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Strip width dL in pixels, overriding the session's value.
    #[arg(long)]
    dl: Option<String>,

    /// Path to write the result records (JSON).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliFitArgs {
    /// JSON array of markers: `[{"x": .., "y": .., "designation": "start"}, ..]`.
    #[arg(long)]
    points: PathBuf,

    /// Analysis configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Result records written by `measure --out`.
#[derive(Debug, Serialize)]
struct MeasureOutput {
    track: TrackMeasurement,
    angle: Option<AngleMeasurement>,
    density: Option<DensityMeasurement>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Measure(args) => run_measure(&args),
        Commands::Fit(args) => run_fit(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

fn load_config(path: Option<&PathBuf>) -> CliResult<AnalysisConfig> {
    match path {
        Some(p) => {
            tracing::info!("Loading config: {}", p.display());
            AnalysisConfig::from_json_file(p).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", p.display(), e).into()
            })
        }
        None => Ok(AnalysisConfig::default()),
    }
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
    Ok(())
}

// ── fit ────────────────────────────────────────────────────────────────

fn run_fit(args: &CliFitArgs) -> CliResult<()> {
    let analyzer = TrackAnalyzer::with_config(load_config(args.config.as_ref())?);
    let data = std::fs::read_to_string(&args.points)?;
    let points: Vec<TrackPoint> = serde_json::from_str(&data)?;
    tracing::info!("Loaded {} markers from {}", points.len(), args.points.display());

    let track = analyzer.measure(&points)?;
    print!("{}", report::fitted_circle(&track));
    print!("{}", report::momentum(&track));
    if let Some(length) = &track.length {
        print!("{}", report::track_length(length));
    }
    Ok(())
}

// ── measure ────────────────────────────────────────────────────────────

fn run_measure(args: &CliMeasureArgs) -> CliResult<()> {
    tracing::info!("Loading session: {}", args.session.display());
    let session = Session::from_json_file(&args.session)?;
    let analyzer = TrackAnalyzer::with_config(load_config(args.config.as_ref())?);
    tracing::info!("Session has {} markers", session.points.len());

    let track = analyzer.measure(&session.points)?;
    print!("{}", report::fitted_circle(&track));
    print!("{}", report::momentum(&track));
    match &track.length {
        Some(length) => print!("{}", report::track_length(length)),
        None => tracing::warn!("Start and end points must be selected to measure the track length"),
    }

    let angle = match analyzer.opening_angle(&track, &session.points, &session.reference) {
        Ok(angle) => {
            print!("{}", report::opening_angle(&angle));
            Some(angle)
        }
        Err(e) => {
            tracing::warn!("Opening angle skipped: {}", e);
            None
        }
    };

    let density = match measure_density(args, &session, &analyzer, &track) {
        Ok(density) => density,
        Err(e) => {
            tracing::warn!("Optical density skipped: {}", e);
            None
        }
    };

    if let Some(out) = &args.out {
        let output = MeasureOutput {
            track,
            angle,
            density,
        };
        std::fs::write(out, serde_json::to_string_pretty(&output)?)?;
        tracing::info!("Results written to {}", out.display());
    }
    Ok(())
}

fn measure_density(
    args: &CliMeasureArgs,
    session: &Session,
    analyzer: &TrackAnalyzer,
    track: &TrackMeasurement,
) -> CliResult<Option<DensityMeasurement>> {
    let dl = match &args.dl {
        Some(text) => Some(Calibration::parse_value("dl", text)?),
        None => session.dl,
    };
    let Some(dl) = dl else {
        tracing::warn!("No dL given; optical density skipped");
        return Ok(None);
    };
    let Some(image_path) = args.image.as_ref().or(session.image.as_ref()) else {
        tracing::warn!("No image given; optical density skipped");
        return Ok(None);
    };

    tracing::info!("Loading image: {}", image_path.display());
    let img = image::open(image_path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", image_path.display(), e).into()
    })?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let density = analyzer.optical_density(track, &gray, dl)?;
    print!("{}", report::optical_density(&density));
    Ok(Some(density))
}
