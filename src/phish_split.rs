/*
cargo run --bin phish_split

cargo run --bin phish_split -- \
    --input data/Phishing_Email.csv \
    --output-dir data/json \
    --train-count 30 --test-count 20 \
    --max-chunk-kb 5000 \
    --seed 42
*/

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use log::info;
use phish_split::config::{
    DEFAULT_INPUT, DEFAULT_LEARN_PREFIX, DEFAULT_MAX_CHUNK_KB, DEFAULT_NEGATIVE_LABEL,
    DEFAULT_POSITIVE_LABEL, DEFAULT_TEST_COUNT, DEFAULT_TEST_FILE, DEFAULT_TRAIN_COUNT,
    DEFAULT_TRAIN_EMAIL_FILE, DEFAULT_TRAIN_LABEL_FILE,
};
use phish_split::{ChunkStrategy, ConvertConfig, LabelPolicy, LoaderConfig, Summary};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};

// Convert a labelled phishing email CSV into JSON training / testing / learning files
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV input with a header row and id, email, label columns
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory every output file is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_TRAIN_EMAIL_FILE)]
    train_email_file: String,

    #[arg(long, default_value = DEFAULT_TRAIN_LABEL_FILE)]
    train_label_file: String,

    #[arg(long, default_value = DEFAULT_TEST_FILE)]
    test_file: String,

    /// Learning chunks are named <prefix>_1.json, <prefix>_2.json, ...
    #[arg(long, default_value = DEFAULT_LEARN_PREFIX)]
    learn_prefix: String,

    #[arg(long, default_value_t = DEFAULT_TRAIN_COUNT)]
    train_count: usize,

    #[arg(long, default_value_t = DEFAULT_TEST_COUNT)]
    test_count: usize,

    /// Upper bound for a learning chunk, in KB (1024 bytes)
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_KB)]
    max_chunk_kb: usize,

    /// Label text marking a phishing email
    #[arg(long, default_value = DEFAULT_POSITIVE_LABEL)]
    positive_label: String,

    /// Label text marking a safe email (checked with --strict-labels)
    #[arg(long, default_value = DEFAULT_NEGATIVE_LABEL)]
    negative_label: String,

    /// Fail on labels that are neither the positive nor the negative one
    #[arg(long)]
    strict_labels: bool,

    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Seed for the split (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = ChunkStrategy::Estimate)]
    chunk_strategy: ChunkStrategy,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Terminal log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level {s:?}"))
}

impl Args {
    fn to_config(&self) -> Result<ConvertConfig> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| {
                format!("Delimiter {:?} is not a single ASCII character", self.delimiter)
            })?;

        let label_policy = if self.strict_labels {
            LabelPolicy::Strict {
                negative: self.negative_label.clone(),
            }
        } else {
            LabelPolicy::Lenient
        };

        Ok(ConvertConfig {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            train_email_file: self.train_email_file.clone(),
            train_label_file: self.train_label_file.clone(),
            test_file: self.test_file.clone(),
            learn_prefix: self.learn_prefix.clone(),
            train_count: self.train_count,
            test_count: self.test_count,
            max_chunk_kb: self.max_chunk_kb,
            chunk_strategy: self.chunk_strategy,
            loader: LoaderConfig {
                delimiter,
                positive_label: self.positive_label.clone(),
                label_policy,
            },
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.to_config()?;

    // logging setup
    create_dir_all(&args.log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = args.log_dir.join(format!("phish_split_{ts}.log"));
    CombinedLogger::init(vec![
        TermLogger::new(
            args.log_level,
            LogConfig::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            LogConfig::default(),
            File::create(&log_path)
                .with_context(|| format!("Failed to create log file {}", log_path.display()))?,
        ),
    ])?;

    let seed = args
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64);
    info!("Starting conversion of {}", config.input.display());
    info!(
        "Counts - Train: {}, Test: {}, max chunk: {} KB, seed: {seed}",
        config.train_count, config.test_count, config.max_chunk_kb
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let summary = phish_split::run(&config, &mut rng).map_err(|err| {
        let stage = err.stage();
        anyhow::Error::new(err).context(format!("{stage} stage failed"))
    })?;

    info!("All done successfully.");
    print_summary(&summary, seed, &log_path);
    Ok(())
}

fn print_summary(summary: &Summary, seed: u64, log_path: &Path) {
    println!(
        "CSV data from {} has been converted to JSON and split into:",
        summary.input.display()
    );
    println!(
        "  - training data, {} records ({} and {})",
        summary.train_email.records,
        summary.train_email.path.display(),
        summary.train_label.path.display()
    );
    println!(
        "  - testing data, {} records ({})",
        summary.test.records,
        summary.test.path.display()
    );
    println!(
        "  - learning data, {} records in {} file(s):",
        summary.learning_records,
        summary.learning_chunks.len()
    );
    for chunk in &summary.learning_chunks {
        println!(
            "      {} ({} records, {} bytes)",
            chunk.path.display(),
            chunk.records,
            chunk.bytes
        );
    }
    println!("Total records : {}", summary.total_records);
    println!("Seed          : {seed}");
    println!("Log file      : {}", log_path.display());
}
