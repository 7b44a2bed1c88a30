//! classic-ml: runs the learners over delimited dataset files and prints reports.
//!
//! # Commands
//!
//! - `knn`: normalize, split, and report accuracy for each k
//! - `kmeans`: label-seeded clustering, report iterations and cluster contents
//! - `perceptron`: train on the whole file and report accuracy per epoch

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use classic_learners::config::{KMeansConfig, KnnConfig, PerceptronConfig};
use classic_learners::dataset::DelimitedLoader;
use classic_learners::distance::KnnDistance;
use classic_learners::kmeans::KMeans;
use classic_learners::knn::{self, KnnClassifier};
use classic_learners::perceptron::Perceptron;
use classic_learners::{DataPoint, Result};

#[derive(Parser)]
#[command(name = "classic-ml")]
#[command(version)]
#[command(about = "k-means, k-NN and perceptron over small delimited datasets")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Dataset file
    file: PathBuf,
    /// Column separator
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,
    /// Zero-based label column (default: last column)
    #[arg(short, long)]
    label_column: Option<usize>,
    /// The first line holds data, not column names
    #[arg(long)]
    no_header: bool,
}

impl Source {
    fn loader(&self) -> DelimitedLoader {
        DelimitedLoader {
            delimiter: self.delimiter,
            label_column: self.label_column,
            has_header: !self.no_header,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// k-nearest-neighbors accuracy sweep over several k values
    Knn {
        #[command(flatten)]
        source: Source,
        /// k values to evaluate
        #[arg(short, long, value_delimiter = ',', default_values_t = KnnConfig::DEFAULT_K_VALUES)]
        k: Vec<usize>,
        /// Fraction of the data used as the reference set
        #[arg(long, default_value_t = KnnConfig::DEFAULT_SPLIT_RATIO)]
        ratio: f64,
        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,
        /// Skip min-max normalization
        #[arg(long)]
        raw: bool,
    },
    /// Label-seeded k-means clustering with Manhattan distance
    Kmeans {
        #[command(flatten)]
        source: Source,
        #[arg(short, long, default_value_t = KMeansConfig::DEFAULT_CLUSTERS)]
        clusters: usize,
        #[arg(long, default_value_t = KMeansConfig::DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
    },
    /// Online perceptron training on a two-label dataset
    Perceptron {
        #[command(flatten)]
        source: Source,
        #[arg(short, long, default_value_t = PerceptronConfig::DEFAULT_EPOCHS)]
        epochs: usize,
        #[arg(long, default_value_t = PerceptronConfig::DEFAULT_LEARNING_RATE)]
        learning_rate: f64,
        #[arg(long, default_value_t = PerceptronConfig::DEFAULT_LABEL_MIN, allow_negative_numbers = true)]
        label_min: i64,
        #[arg(long, default_value_t = PerceptronConfig::DEFAULT_LABEL_MAX, allow_negative_numbers = true)]
        label_max: i64,
    },
}

fn run_knn(source: &Source, config: &KnnConfig) -> Result<()> {
    println!("Analyzed dataset: {}", source.file.display());
    println!("Reading the dataset...");
    let dataset: Vec<DataPoint<f64, String>> = source.loader().load_file(&source.file)?;
    if dataset.is_empty() {
        println!("Unable to load data");
        return Ok(());
    }
    let prepared = if config.normalize {
        knn::normalize(&dataset)?
    } else {
        dataset
    };
    let (train, test) = match config.seed {
        Some(seed) => knn::split_seeded(&prepared, config.split_ratio, seed)?,
        None => knn::split(&prepared, config.split_ratio, &mut rand::thread_rng())?,
    };
    info!(train = train.len(), test = test.len(), "running k-NN sweep");

    for &k in config.k_values.iter() {
        let mut classifier = KnnClassifier::new(k, KnnDistance::Manhattan)?;
        classifier.fit(train.clone())?;
        let accuracy = classifier.score(&test)?;
        println!("Accuracy for k={}: {:.2}%", k, accuracy * 100.0);
    }
    Ok(())
}

fn run_kmeans(source: &Source, config: &KMeansConfig) -> Result<()> {
    let dataset: Vec<DataPoint<f64, i64>> = source.loader().load_file(&source.file)?;
    let result = KMeans::from_config(config).cluster(&dataset, &KnnDistance::Manhattan)?;
    println!("Converged after {} iterations", result.iterations);
    for (index, group) in result.assignment.iter().enumerate() {
        let labels: Vec<String> = group.iter().map(|p| p.label.to_string()).collect();
        println!("Cluster {} ({} points): [{}]", index, group.len(), labels.join(", "));
    }
    Ok(())
}

fn run_perceptron(source: &Source, config: &PerceptronConfig) -> Result<()> {
    let dataset: Vec<DataPoint<f64, i64>> = source.loader().load_file(&source.file)?;
    let feature_count = dataset.first().map_or(0, DataPoint::dimensions);
    let mut model = Perceptron::from_config(feature_count, config)?;
    let mistakes = model.train_epochs(&dataset, config.epochs)?;
    for (epoch, count) in mistakes.iter().enumerate() {
        println!("Epoch {}: {} misclassified", epoch + 1, count);
    }
    println!("Weights: {:?}, bias: {:.4}", model.weights(), model.bias());
    println!("Accuracy: {:.2}%", model.accuracy(&dataset)? * 100.0);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match &cli.command {
        Commands::Knn { source, k, ratio, seed, raw } => {
            let config = KnnConfig {
                k_values: k.clone(),
                split_ratio: *ratio,
                seed: *seed,
                normalize: !raw,
            };
            run_knn(source, &config)
        }
        Commands::Kmeans { source, clusters, max_iterations } => {
            let config = KMeansConfig {
                clusters: *clusters,
                max_iterations: *max_iterations,
            };
            run_kmeans(source, &config)
        }
        Commands::Perceptron { source, epochs, learning_rate, label_min, label_max } => {
            let config = PerceptronConfig {
                learning_rate: *learning_rate,
                epochs: *epochs,
                label_min: *label_min,
                label_max: *label_max,
                ..PerceptronConfig::default()
            };
            run_perceptron(source, &config)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
