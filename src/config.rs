use std::path::PathBuf;

use crate::writer::ChunkStrategy;

pub const DEFAULT_INPUT: &str = "Phishing_Email.csv";
pub const DEFAULT_TRAIN_EMAIL_FILE: &str = "Phishing_Training_Data.json";
pub const DEFAULT_TRAIN_LABEL_FILE: &str = "Phishing_Training_Result.json";
pub const DEFAULT_TEST_FILE: &str = "Phishing_Testing_Data.json";
pub const DEFAULT_LEARN_PREFIX: &str = "Phishing_Learning_Data";
pub const DEFAULT_TRAIN_COUNT: usize = 30;
pub const DEFAULT_TEST_COUNT: usize = 20;
pub const DEFAULT_MAX_CHUNK_KB: usize = 5000; // 5 MB
pub const DEFAULT_POSITIVE_LABEL: &str = "Phishing Email";
pub const DEFAULT_NEGATIVE_LABEL: &str = "Safe Email";

/// How label strings other than the positive one are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Anything that is not the positive label is the negative class.
    Lenient,
    /// Only the positive or this negative label are accepted.
    Strict { negative: String },
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub delimiter: u8,
    pub positive_label: String,
    pub label_policy: LabelPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            positive_label: DEFAULT_POSITIVE_LABEL.to_string(),
            label_policy: LabelPolicy::Lenient,
        }
    }
}

/// Everything a conversion run needs. Output names are joined onto
/// `output_dir`.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub train_email_file: String,
    pub train_label_file: String,
    pub test_file: String,
    pub learn_prefix: String,
    pub train_count: usize,
    pub test_count: usize,
    pub max_chunk_kb: usize,
    pub chunk_strategy: ChunkStrategy,
    pub loader: LoaderConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            train_email_file: DEFAULT_TRAIN_EMAIL_FILE.to_string(),
            train_label_file: DEFAULT_TRAIN_LABEL_FILE.to_string(),
            test_file: DEFAULT_TEST_FILE.to_string(),
            learn_prefix: DEFAULT_LEARN_PREFIX.to_string(),
            train_count: DEFAULT_TRAIN_COUNT,
            test_count: DEFAULT_TEST_COUNT,
            max_chunk_kb: DEFAULT_MAX_CHUNK_KB,
            chunk_strategy: ChunkStrategy::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl ConvertConfig {
    pub fn train_email_path(&self) -> PathBuf {
        self.output_dir.join(&self.train_email_file)
    }

    pub fn train_label_path(&self) -> PathBuf {
        self.output_dir.join(&self.train_label_file)
    }

    pub fn test_path(&self) -> PathBuf {
        self.output_dir.join(&self.test_file)
    }

    pub fn learn_prefix_path(&self) -> PathBuf {
        self.output_dir.join(&self.learn_prefix)
    }
}
