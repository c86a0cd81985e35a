use crate::commands::{run_analyze, run_geocode_batch, run_locate, run_prefilter};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lihtc_screen::error::AppError;
use lihtc_screen::workflows::screening::{CreditType, TargetPopulation};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lihtc-screen",
    about = "Screen candidate parcels for LIHTC feasibility",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the fatal-condition pre-filter only and write every row with its outcome
    Prefilter(PrefilterArgs),
    /// Run the full pipeline: pre-filter, weighted scoring and ranking
    Analyze(AnalyzeArgs),
    /// Diagnose a single coordinate against the reference layers
    Locate(LocateArgs),
    /// Write a Census batch geocoder upload file for rows missing coordinates
    GeocodeBatch(GeocodeBatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

/// Reference layer and rule overrides shared by the batch commands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ReferenceArgs {
    /// QCT polygons (GeoJSON)
    #[arg(long)]
    pub(crate) qct: Option<PathBuf>,
    /// DDA polygons (GeoJSON)
    #[arg(long)]
    pub(crate) dda: Option<PathBuf>,
    /// FEMA flood hazard polygons (GeoJSON)
    #[arg(long)]
    pub(crate) flood: Option<PathBuf>,
    /// Existing LIHTC developments (CSV)
    #[arg(long)]
    pub(crate) competitors: Option<PathBuf>,
    /// Competition rule application year
    #[arg(long, value_parser = crate::infra::parse_application_year)]
    pub(crate) application_year: Option<i32>,
    /// Credit type: 9 or 4
    #[arg(long, value_parser = crate::infra::parse_credit_type)]
    pub(crate) credit_type: Option<CreditType>,
    /// State applied to rows with a blank state column
    #[arg(long)]
    pub(crate) default_state: Option<String>,
    /// Eliminate SFHA sites instead of penalizing them
    #[arg(long)]
    pub(crate) flood_high_is_fatal: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PrefilterArgs {
    /// Property spreadsheet (CSV)
    #[arg(long)]
    pub(crate) properties: PathBuf,
    /// Output CSV; written to stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Census batch geocoder results used to fill blank coordinates
    #[arg(long)]
    pub(crate) geocode_results: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Property spreadsheet (CSV)
    #[arg(long)]
    pub(crate) properties: PathBuf,
    /// Output CSV; written to stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Also write a self-contained HTML report
    #[arg(long)]
    pub(crate) html: Option<PathBuf>,
    /// Also write the run summary as JSON
    #[arg(long)]
    pub(crate) summary_json: Option<PathBuf>,
    /// Scoring weights (JSON); missing keys keep their defaults
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
    /// Limit the ranked rows in the outputs to the best N
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Census batch geocoder results used to fill blank coordinates
    #[arg(long)]
    pub(crate) geocode_results: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct LocateArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat: f64,
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lon: f64,
    /// State code; defaults to the configured default state
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// County name, used by the two-mile rule
    #[arg(long)]
    pub(crate) county: Option<String>,
    /// Target population: general, elderly or supportive
    #[arg(long, value_parser = crate::infra::parse_population)]
    pub(crate) population: Option<TargetPopulation>,
    #[command(flatten)]
    pub(crate) reference: ReferenceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct GeocodeBatchArgs {
    /// Property spreadsheet (CSV)
    #[arg(long)]
    pub(crate) properties: PathBuf,
    /// Upload file for the Census batch geocoder
    #[arg(long)]
    pub(crate) output: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Prefilter(args) => run_prefilter(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Locate(args) => run_locate(args),
        Command::GeocodeBatch(args) => run_geocode_batch(args),
    }
}
