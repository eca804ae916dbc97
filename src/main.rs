use anyhow::{ensure, Context, Result};
use clap::Parser;
use kdvote::{KDTree, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Classifies held-out points with k-nearest-neighbor votes over a k-d tree
/// and reports the accuracy for every k up to `--max-k`.
#[derive(Parser)]
#[command(name = "kdvote", version, about = "k-d tree nearest neighbor classifier")]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Bincode data set to classify. A random one is generated when omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Write the data set that was used to this path.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Number of training points to generate.
    #[arg(long, default_value_t = 10_000)]
    points: usize,

    /// Number of query points to generate.
    #[arg(long, default_value_t = 1_000)]
    queries: usize,

    /// Number of distinct labels to generate.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..))]
    classes: u8,

    /// Largest k to evaluate.
    #[arg(long, default_value_t = 25)]
    max_k: usize,

    /// Seed for the data generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LabelledPoint {
    x: f64,
    y: f64,
    label: u8,
}

impl LabelledPoint {
    fn point(&self) -> Point<2> {
        Point::new([self.x, self.y])
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DataSet {
    training: Vec<LabelledPoint>,
    queries: Vec<LabelledPoint>,
}

/// `RUST_LOG` overrides the verbosity flag if set.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kdvote={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Draws points from overlapping square clusters whose centres sit evenly on
/// a circle, labelling each point with its cluster.
fn generate(rng: &mut StdRng, count: usize, classes: u8) -> Vec<LabelledPoint> {
    (0..count)
        .map(|_| {
            let label = rng.gen_range(0..classes);
            let angle = std::f64::consts::TAU * label as f64 / classes as f64;
            LabelledPoint {
                x: 50.0 * angle.cos() + rng.gen_range(-40.0..40.0),
                y: 50.0 * angle.sin() + rng.gen_range(-40.0..40.0),
                label,
            }
        })
        .collect()
}

fn load(path: &Path) -> Result<DataSet> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("decoding data set {}", path.display()))
}

fn save(path: &Path, data: &DataSet) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), data)
        .with_context(|| format!("encoding data set {}", path.display()))
}

fn run(cli: &Cli) -> Result<()> {
    let data = match &cli.data {
        Some(path) => load(path)?,
        None => {
            let mut rng = StdRng::seed_from_u64(cli.seed);
            DataSet {
                training: generate(&mut rng, cli.points, cli.classes),
                queries: generate(&mut rng, cli.queries, cli.classes),
            }
        }
    };
    if let Some(path) = &cli.save {
        save(path, &data)?;
        info!(path = %path.display(), "saved data set");
    }
    ensure!(!data.queries.is_empty(), "data set has no query points");

    let tree: KDTree<2, u8> = data
        .training
        .iter()
        .map(|sample| (sample.point(), sample.label))
        .collect();
    info!(
        points = tree.size(),
        duplicates = data.training.len() - tree.size(),
        "built tree"
    );

    for k in 1..=cli.max_k {
        let correct = data
            .queries
            .iter()
            .filter(|sample| {
                tree.knn_vote(&sample.point(), k)
                    .map_or(false, |vote| vote.value == sample.label)
            })
            .count();
        debug!(k, correct, "evaluated");
        println!(
            "k={}: {:.2}% of {} queries classified correctly",
            k,
            correct as f64 / data.queries.len() as f64 * 100.0,
            data.queries.len()
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
