use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Partition,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Partition => "partition",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

/// A file the writer was producing when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Chunk { number: usize, path: PathBuf },
}

impl OutputTarget {
    pub fn path(&self) -> &Path {
        match self {
            OutputTarget::File(path) => path,
            OutputTarget::Chunk { path, .. } => path,
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::File(path) => write!(f, "file {}", path.display()),
            OutputTarget::Chunk { number, path } => {
                write!(f, "chunk {number} ({})", path.display())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unable to open input {}: {source}", .path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unable to read header of {}: {source}", .path.display())]
    HeaderRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("record {id} at line {line} has unrecognized label {label:?}")]
    UnrecognizedLabel { id: String, line: u64, label: String },

    #[error(
        "training count ({train}) plus testing count ({test}) must be less than the total records ({total})"
    )]
    InsufficientData {
        train: usize,
        test: usize,
        total: usize,
    },

    #[error("unable to serialize {target}: {source}")]
    Serialization {
        target: OutputTarget,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to write {target}: {source}")]
    Write {
        target: OutputTarget,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub fn stage(&self) -> Stage {
        match self {
            ConvertError::InputOpen { .. }
            | ConvertError::HeaderRead { .. }
            | ConvertError::MalformedRecord { .. }
            | ConvertError::UnrecognizedLabel { .. } => Stage::Input,
            ConvertError::InsufficientData { .. } => Stage::Partition,
            ConvertError::Serialization { .. } | ConvertError::Write { .. } => Stage::Output,
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let err = ConvertError::InsufficientData {
            train: 30,
            test: 20,
            total: 50,
        };
        assert_eq!(err.stage(), Stage::Partition);
        assert_eq!(err.stage().to_string(), "partition");

        let err = ConvertError::MalformedRecord {
            line: 4,
            reason: "expected 3 fields, found 2".into(),
        };
        assert_eq!(err.stage(), Stage::Input);
    }

    #[test]
    fn test_chunk_target_is_named_in_message() {
        let err = ConvertError::Write {
            target: OutputTarget::Chunk {
                number: 3,
                path: PathBuf::from("out/Learn_3.json"),
            },
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("chunk 3"), "{msg}");
        assert!(msg.contains("out/Learn_3.json"), "{msg}");
        assert_eq!(err.stage(), Stage::Output);
    }
}
