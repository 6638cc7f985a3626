//! automl-select - Training entry point
//!
//! Invokes a full selection run over a transformed train/test CSV pair.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use automl_select::loading::load_csv_dataset;
use automl_select::pipeline::{PipelineConfig, TrainPipeline};
use automl_select::tracking::TrackingConfig;

#[derive(Parser)]
#[command(name = "automl-select")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Model selection engine for tabular regression")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run model selection on a transformed train/test pair
    Train {
        /// Training CSV (numeric, already transformed)
        #[arg(long)]
        train: PathBuf,
        /// Held-out test CSV
        #[arg(long)]
        test: PathBuf,
        /// Label column name
        #[arg(long)]
        target: String,
        /// Minimum-quality threshold on the winning r²
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
        /// Experiment tracking endpoint
        #[arg(long, default_value = "file://mlruns")]
        tracking_uri: String,
        /// Winning model destination
        #[arg(long, default_value = "artifacts/model.pkl")]
        model_path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "automl_select=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            train,
            test,
            target,
            threshold,
            tracking_uri,
            model_path,
        } => {
            let train_ds = load_csv_dataset(&train, &target)
                .with_context(|| format!("loading {}", train.display()))?;
            let test_ds = load_csv_dataset(&test, &target)
                .with_context(|| format!("loading {}", test.display()))?;

            let config = PipelineConfig {
                threshold,
                tracking: TrackingConfig::new(tracking_uri),
                model_path,
                ..PipelineConfig::default()
            };
            let pipeline = TrainPipeline::new(config);
            let score = pipeline.run(&train_ds, &test_ds)?;
            println!("winning model held-out r2: {score:.4}");
        }
    }

    Ok(())
}
