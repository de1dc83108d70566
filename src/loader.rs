use std::collections::HashSet;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};

use crate::config::{LabelPolicy, LoaderConfig, DEFAULT_NEGATIVE_LABEL};
use crate::error::{ConvertError, Result};
use crate::record::EmailRecord;

const EXPECTED_FIELDS: usize = 3;

/// Load the labelled dataset from a delimited file. The header row is
/// read and discarded.
pub fn load_records(path: &Path, config: &LoaderConfig) -> Result<Vec<EmailRecord>> {
    let reader = builder(config)
        .from_path(path)
        .map_err(|source| ConvertError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let records = read_records(reader, path, config)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Same as [`load_records`] for an already opened source. `origin` is only
/// used in error messages.
pub fn load_from_reader<R: Read>(
    source: R,
    origin: &Path,
    config: &LoaderConfig,
) -> Result<Vec<EmailRecord>> {
    read_records(builder(config).from_reader(source), origin, config)
}

fn builder(config: &LoaderConfig) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    // field count is checked per row so the error carries the line
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter);
    builder
}

fn read_records<R: Read>(
    mut reader: csv::Reader<R>,
    origin: &Path,
    config: &LoaderConfig,
) -> Result<Vec<EmailRecord>> {
    let mut row = StringRecord::new();

    match reader.read_record(&mut row) {
        Ok(true) => debug!("Skipping header {:?}", row),
        Ok(false) => {
            return Err(ConvertError::HeaderRead {
                path: origin.to_path_buf(),
                source: csv::Error::from(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input has no header row",
                )),
            })
        }
        Err(source) => {
            return Err(ConvertError::HeaderRead {
                path: origin.to_path_buf(),
                source,
            })
        }
    }

    let mut records = Vec::new();
    let mut unknown_labels: HashSet<String> = HashSet::new();

    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                let line = err
                    .position()
                    .map(|p| p.line())
                    .unwrap_or_else(|| reader.position().line());
                return Err(ConvertError::MalformedRecord {
                    line,
                    reason: err.to_string(),
                });
            }
        }

        let line = row.position().map(|p| p.line()).unwrap_or_default();
        if row.len() != EXPECTED_FIELDS {
            return Err(ConvertError::MalformedRecord {
                line,
                reason: format!("expected {EXPECTED_FIELDS} fields, found {}", row.len()),
            });
        }

        let id = &row[0];
        let label = &row[2];
        let phish = label == config.positive_label;

        if !phish {
            match &config.label_policy {
                LabelPolicy::Strict { negative } if label != negative.as_str() => {
                    return Err(ConvertError::UnrecognizedLabel {
                        id: id.to_string(),
                        line,
                        label: label.to_string(),
                    });
                }
                LabelPolicy::Strict { .. } => {}
                LabelPolicy::Lenient => {
                    // no explicit negative label here, so only warn about
                    // labels that differ from the conventional one
                    if label != DEFAULT_NEGATIVE_LABEL && !unknown_labels.contains(label) {
                        warn!("Label {label:?} (line {line}) treated as not phishing");
                        unknown_labels.insert(label.to_string());
                    }
                }
            }
        }

        records.push(EmailRecord::new(id, &row[1], phish));
    }

    Ok(records)
}
