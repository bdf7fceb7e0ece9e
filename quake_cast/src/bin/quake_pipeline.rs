//! Command-line entry point: catalogue in, forecast tables out

use clap::Parser;
use quake_cast::config::PipelineConfig;
use quake_cast::pipeline::ForecastPipeline;
use quake_cast::ForecastError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Forecast annual seismic event counts from an event catalogue
#[derive(Debug, Parser)]
#[command(name = "quake_pipeline", version, about)]
struct Cli {
    /// Event catalogue (CSV with at least a time column)
    #[arg(long)]
    input: PathBuf,

    /// JSON configuration; missing keys take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving the exported tables
    #[arg(long, default_value = "exports")]
    output_dir: PathBuf,

    /// Number of future years to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Last year used for training in the hold-out evaluation
    #[arg(long)]
    train_cutoff: Option<i32>,

    /// Only forecast; do not run the hold-out evaluation
    #[arg(long)]
    skip_evaluation: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quake_cast=info,quake_pipeline=info".into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ForecastError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(cutoff) = cli.train_cutoff {
        config.train_cutoff = cutoff;
    }

    let pipeline = ForecastPipeline::new(config)?;
    let output = pipeline.run_csv(&cli.input, !cli.skip_evaluation)?;
    output.write_to(&cli.output_dir)?;

    println!("Combined forecast:");
    for point in output.forecast.combined.points() {
        println!(
            "  {}  {:>10.1}  [{:.1}, {:.1}]",
            point.period,
            point.predicted_value,
            point.lower_bound.unwrap_or(point.predicted_value),
            point.upper_bound.unwrap_or(point.predicted_value),
        );
    }

    if let Some(evaluation) = &output.evaluation {
        for (model, report) in &evaluation.reports {
            println!("\n[{model}]");
            print!("{report}");
        }
    }

    Ok(())
}
