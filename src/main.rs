use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use breezo_features::DEFAULT_TOP_K;
use breezo_io::{ClassReport, DatasetReader, FeatureWeight, HoldoutReport, ReportWriter, TrainingReport};
use breezo_model::{DiagnosisModel, Evaluation, Observation, TrainingConfig};
use breezo_serve::AppState;

/// Columns listed under `top_features` in the training report.
const REPORTED_FEATURES: usize = 15;

#[derive(Parser)]
#[command(name = "breezo")]
#[command(about = "Disease prediction from free-text symptoms, age and sex")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Train the model on a CSV table and write the artifact set
    Train {
        /// Training CSV with Disease, Symptoms, Age and Sex columns
        #[arg(long)]
        data: PathBuf,

        /// Directory for the artifact files and training report
        #[arg(long, default_value = "models")]
        output_dir: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth (unlimited if omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Maximum number of TF-IDF terms
        #[arg(long, default_value_t = breezo_features::DEFAULT_MAX_VOCABULARY)]
        max_vocabulary: usize,

        /// Fraction of rows held out for evaluation, in [0, 1) (0 disables evaluation)
        #[arg(long, default_value_t = 0.2, value_parser = parse_test_size)]
        test_size: f64,
    },

    /// Rank diseases for one observation using saved artifacts
    Predict {
        /// Directory holding the artifact set
        #[arg(long, default_value = "models")]
        artifacts: PathBuf,

        /// Free-text symptom description
        #[arg(long)]
        symptoms: String,

        /// Patient age in years
        #[arg(long)]
        age: f64,

        /// Patient sex, as spelled in the training data
        #[arg(long)]
        sex: String,

        /// Number of diagnoses to return
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Directory holding the artifact set
        #[arg(long, default_value = "models")]
        artifacts: PathBuf,

        /// Interface to bind
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,

        /// Port to bind
        #[arg(long, default_value_t = 5001)]
        port: u16,

        /// Number of diagnoses returned per request
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    run_id: String,
    n_records: usize,
    rows_dropped: usize,
    n_classes: usize,
    n_features: usize,
    holdout_accuracy: Option<f64>,
    output_dir: PathBuf,
}

fn parse_test_size(raw: &str) -> Result<f64, String> {
    let size: f64 = raw
        .parse()
        .map_err(|_| format!("\"{raw}\" is not a number"))?;
    if !(0.0..1.0).contains(&size) {
        return Err(format!("{size} is outside [0, 1)"));
    }
    Ok(size)
}

fn holdout_report(evaluation: &Evaluation) -> HoldoutReport {
    HoldoutReport {
        n_train: evaluation.n_train,
        n_test: evaluation.n_test,
        accuracy: evaluation.accuracy,
        classes: evaluation
            .per_disease
            .iter()
            .map(|m| ClassReport {
                disease: m.disease.clone(),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                support: m.support,
            })
            .collect(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            output_dir,
            n_trees,
            max_depth,
            max_vocabulary,
            test_size,
        } => {
            // 1. Read and clean
            let dataset = DatasetReader::new(&data)
                .read()
                .context("failed to read training CSV")?;

            // 2. Train, scoring a holdout split first when requested
            let config = TrainingConfig::new()
                .with_n_trees(n_trees)
                .with_max_depth(max_depth)
                .with_max_vocabulary(max_vocabulary)
                .with_test_fraction((test_size > 0.0).then_some(test_size))
                .with_seed(cli.seed);
            let outcome =
                DiagnosisModel::train(&dataset, &config).context("training failed")?;
            let model = outcome.model;
            if let Some(evaluation) = &outcome.evaluation {
                info!(
                    accuracy = evaluation.accuracy,
                    n_test = evaluation.n_test,
                    "holdout evaluation"
                );
            }

            // 3. Persist artifacts
            model
                .save(&output_dir)
                .context("failed to save model artifacts")?;

            // 4. Write the run report
            let report = TrainingReport {
                run_id: model.run_id().to_string(),
                data_path: data.display().to_string(),
                cleaning: dataset.summary().clone(),
                n_classes: model.n_classes(),
                n_features: model.n_features(),
                vocabulary_size: model.encoder().tfidf().len(),
                n_trees: model.n_trees(),
                seed: cli.seed,
                top_features: model
                    .top_features(REPORTED_FEATURES)
                    .into_iter()
                    .map(|(feature, importance)| FeatureWeight { feature, importance })
                    .collect(),
                holdout: outcome.evaluation.as_ref().map(holdout_report),
            };
            ReportWriter::new(&output_dir)?.write_training(&report)?;

            // 5. Print summary
            let output = TrainOutput {
                run_id: report.run_id,
                n_records: dataset.len(),
                rows_dropped: dataset.summary().rows_dropped,
                n_classes: report.n_classes,
                n_features: report.n_features,
                holdout_accuracy: outcome.evaluation.map(|e| e.accuracy),
                output_dir,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            artifacts,
            symptoms,
            age,
            sex,
            top_k,
        } => {
            let model = DiagnosisModel::load(&artifacts).context("failed to load model")?;
            let ranked = model
                .predict(&Observation::new(symptoms, age, sex), top_k)
                .context("prediction failed")?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }

        Command::Serve {
            artifacts,
            host,
            port,
            top_k,
        } => {
            // Load before binding: a broken artifact set never starts serving.
            let model = DiagnosisModel::load(&artifacts).context("failed to load model")?;
            let state = AppState::new(model).with_top_k(top_k);

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime
                .block_on(breezo_serve::serve(SocketAddr::new(host, port), state))
                .context("server failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_args(test_size: &str) -> Vec<&str> {
        vec!["breezo", "train", "--data", "d.csv", "--test-size", test_size]
    }

    fn parsed_test_size(cli: Cli) -> f64 {
        match cli.command {
            Command::Train { test_size, .. } => test_size,
            _ => panic!("expected the train command"),
        }
    }

    #[test]
    fn test_size_defaults_to_a_fifth() {
        let cli = Cli::try_parse_from(["breezo", "train", "--data", "d.csv"]).unwrap();
        assert_eq!(parsed_test_size(cli), 0.2);
    }

    #[test]
    fn zero_test_size_is_accepted() {
        let cli = Cli::try_parse_from(train_args("0")).unwrap();
        assert_eq!(parsed_test_size(cli), 0.0);
    }

    #[test]
    fn out_of_range_test_sizes_are_rejected() {
        for bad in ["-0.1", "1", "1.5", "NaN", "abc"] {
            assert!(Cli::try_parse_from(train_args(bad)).is_err(), "{bad} accepted");
        }
    }
}
