//! Fit the calorie model from a labelled CSV dataset and write the artifacts
//! the web application loads at start-up.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::process::ExitCode;

use calorie_model::{
    DEFAULT_SEED, DEFAULT_TEST_FRACTION, Trainer, TrainerConfig, TrainingReport,
};
use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

/// `train-model` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "train-model",
    about = "Train the calorie expenditure model and write its artifacts",
    version
)]
struct CliArgs {
    /// Labelled CSV dataset.
    #[arg(long, value_name = "path", default_value = "calories.csv")]
    data: Utf8PathBuf,
    /// Directory receiving both artifacts; created if missing.
    #[arg(long = "output-dir", value_name = "dir", default_value = ".")]
    output_dir: Utf8PathBuf,
    /// Model artifact file name inside the output directory.
    #[arg(long = "model-file", value_name = "name", default_value = "model.json")]
    model_file: Utf8PathBuf,
    /// Accuracy file name inside the output directory.
    #[arg(
        long = "accuracy-file",
        value_name = "name",
        default_value = "model_accuracy.txt"
    )]
    accuracy_file: Utf8PathBuf,
    /// Seed for the train/test shuffle.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Share of rows held out for scoring.
    #[arg(long = "test-fraction", default_value_t = DEFAULT_TEST_FRACTION)]
    test_fraction: f64,
}

fn main() -> ExitCode {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .try_init()
    {
        drop(err);
    }

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version requests also arrive here.
            if let Err(print_err) = err.print() {
                drop(print_err);
            }
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args) {
        Ok(report) => {
            write_summary(&args, &report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "training failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "train-model: {err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> io::Result<TrainingReport> {
    Dir::create_ambient_dir_all(&args.output_dir, ambient_authority()).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("create output directory {}: {err}", args.output_dir),
        )
    })?;
    let output = Dir::open_ambient_dir(&args.output_dir, ambient_authority()).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("open output directory {}: {err}", args.output_dir),
        )
    })?;

    let trainer = Trainer::new(TrainerConfig {
        seed: args.seed,
        test_fraction: args.test_fraction,
    });
    trainer
        .train_and_persist(&args.data, &output, &args.model_file, &args.accuracy_file)
        .map_err(io::Error::other)
}

fn write_summary(args: &CliArgs, report: &TrainingReport) {
    let summary = format!(
        "accuracy: {}%\ntrain rows: {}\ntest rows: {}\nmodel: {}\naccuracy file: {}",
        report.accuracy,
        report.train_rows,
        report.test_rows,
        args.output_dir.join(&args.model_file),
        args.output_dir.join(&args.accuracy_file),
    );
    if let Err(err) = writeln!(io::stdout().lock(), "{summary}") {
        drop(err);
    }
}
