use std::fs;
use std::path::PathBuf;

use log::info;
use rand::Rng;

use crate::config::ConvertConfig;
use crate::error::{ConvertError, OutputTarget, Result};
use crate::loader::load_records;
use crate::partition::partition;
use crate::record::{email_views, full_views, label_views};
use crate::writer::{write_chunked, write_json, WrittenFile};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct Summary {
    pub input: PathBuf,
    pub total_records: usize,
    pub train_email: WrittenFile,
    pub train_label: WrittenFile,
    pub test: WrittenFile,
    pub learning_records: usize,
    pub learning_chunks: Vec<WrittenFile>,
}

/// Load, split and write the whole dataset.
///
/// Nothing is written until loading and partitioning succeed. Output
/// files are not rolled back when a later write fails.
pub fn run<R: Rng + ?Sized>(config: &ConvertConfig, rng: &mut R) -> Result<Summary> {
    let records = load_records(&config.input, &config.loader)?;
    let total_records = records.len();

    let split = partition(records, config.train_count, config.test_count, rng)?;

    fs::create_dir_all(&config.output_dir).map_err(|source| ConvertError::Write {
        target: OutputTarget::File(config.output_dir.clone()),
        source,
    })?;

    let train_email = write_json(&config.train_email_path(), &email_views(&split.training))?;
    let train_label = write_json(&config.train_label_path(), &label_views(&split.training))?;
    let test = write_json(&config.test_path(), &full_views(&split.testing))?;

    let learning_chunks = write_chunked(
        &config.learn_prefix_path(),
        &full_views(&split.learning),
        config.max_chunk_kb,
        config.chunk_strategy,
    )?;
    info!(
        "Learning set of {} records written as {} chunk(s)",
        split.learning.len(),
        learning_chunks.len()
    );

    Ok(Summary {
        input: config.input.clone(),
        total_records,
        train_email,
        train_label,
        test,
        learning_records: split.learning.len(),
        learning_chunks,
    })
}
