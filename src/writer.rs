use std::ffi::OsString;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{info, warn};
use serde::Serialize;

use crate::error::{ConvertError, OutputTarget, Result};

pub const BYTES_PER_KB: usize = 1024;

// `[\n` + `\n]` around the elements of a pretty printed array
const ARRAY_FRAME: usize = 4;
// `,\n` between two elements
const ELEMENT_SEPARATOR: usize = 2;

/// How chunk boundaries are measured. Both give the same boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ChunkStrategy {
    /// Serialize each record once and keep a running byte count.
    #[default]
    Estimate,
    /// Re-serialize the whole candidate chunk after every added record.
    Reserialize,
}

/// A JSON file produced by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub records: usize,
    pub bytes: usize,
}

fn to_pretty<T: Serialize + ?Sized>(
    value: &T,
    target: impl FnOnce() -> OutputTarget,
) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|source| ConvertError::Serialization {
        target: target(),
        source,
    })
}

fn persist(bytes: &[u8], target: OutputTarget) -> Result<()> {
    fs::write(target.path(), bytes).map_err(|source| ConvertError::Write { target, source })
}

/// Write `items` as one pretty printed JSON array.
pub fn write_json<T: Serialize>(path: &Path, items: &[T]) -> Result<WrittenFile> {
    let target = || OutputTarget::File(path.to_path_buf());
    let bytes = to_pretty(items, target)?;
    persist(&bytes, target())?;

    info!(
        "Wrote {} records ({} bytes) to {}",
        items.len(),
        bytes.len(),
        path.display()
    );
    Ok(WrittenFile {
        path: path.to_path_buf(),
        records: items.len(),
        bytes: bytes.len(),
    })
}

/// `<prefix>_<number>.json`
pub fn chunk_path(prefix: &Path, number: usize) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(format!("_{number}.json"));
    PathBuf::from(name)
}

/// Greedily group `items` into consecutive ranges whose pretty printed
/// array stays within `max_bytes`. A record too large on its own gets a
/// range to itself.
///
/// `prefix` only names chunks in errors.
pub fn plan_chunks<T: Serialize>(
    items: &[T],
    max_bytes: usize,
    strategy: ChunkStrategy,
    prefix: &Path,
) -> Result<Vec<Range<usize>>> {
    let mut ranges = Vec::new();
    let mut element_sizes: Vec<usize> = Vec::with_capacity(items.len());
    let mut start = 0;

    while start < items.len() {
        let number = ranges.len() + 1;
        let target = || OutputTarget::Chunk {
            number,
            path: chunk_path(prefix, number),
        };

        let mut end = start;
        match strategy {
            ChunkStrategy::Reserialize => {
                while end < items.len() {
                    let size = to_pretty(&items[start..=end], target)?.len();
                    if size > max_bytes {
                        break;
                    }
                    end += 1;
                }
            }
            ChunkStrategy::Estimate => {
                let mut elements = 0;
                while end < items.len() {
                    if element_sizes.len() == end {
                        let single = to_pretty(std::slice::from_ref(&items[end]), target)?;
                        element_sizes.push(single.len() - ARRAY_FRAME);
                    }
                    let count = end - start + 1;
                    let size = elements
                        + element_sizes[end]
                        + ARRAY_FRAME
                        + ELEMENT_SEPARATOR * (count - 1);
                    if size > max_bytes {
                        break;
                    }
                    elements += element_sizes[end];
                    end += 1;
                }
            }
        }

        // can't fit even one record, it goes out alone
        if end == start {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }

    Ok(ranges)
}

/// Write `items` to `<prefix>_1.json`, `<prefix>_2.json`, ... with each file
/// at most `max_kb` kilobytes unless it holds a single oversized record.
///
/// Files written before a failure are left in place.
pub fn write_chunked<T: Serialize>(
    prefix: &Path,
    items: &[T],
    max_kb: usize,
    strategy: ChunkStrategy,
) -> Result<Vec<WrittenFile>> {
    let max_bytes = max_kb.saturating_mul(BYTES_PER_KB);
    let ranges = plan_chunks(items, max_bytes, strategy, prefix)?;

    let mut written = Vec::with_capacity(ranges.len());
    for (idx, range) in ranges.into_iter().enumerate() {
        let number = idx + 1;
        let path = chunk_path(prefix, number);
        let target = || OutputTarget::Chunk {
            number,
            path: path.clone(),
        };

        let chunk = &items[range];
        let bytes = to_pretty(chunk, target)?;
        if bytes.len() > max_bytes {
            warn!(
                "Chunk {number} holds a single record of {} bytes, over the {max_bytes} byte limit",
                bytes.len()
            );
        }
        persist(&bytes, target())?;

        info!(
            "Wrote chunk {number}: {} records ({} bytes) to {}",
            chunk.len(),
            bytes.len(),
            path.display()
        );
        written.push(WrittenFile {
            path,
            records: chunk.len(),
            bytes: bytes.len(),
        });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EmailRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::tempdir;

    fn record(id: usize, body_len: usize) -> EmailRecord {
        EmailRecord::new(id.to_string(), "x".repeat(body_len), id % 2 == 0)
    }

    fn pretty_len(items: &[EmailRecord]) -> usize {
        serde_json::to_vec_pretty(items).unwrap().len()
    }

    fn check_plan(items: &[EmailRecord], max_bytes: usize, ranges: &[Range<usize>]) {
        let mut next = 0;
        for range in ranges {
            assert_eq!(range.start, next, "gap or overlap at {range:?}");
            assert!(range.end > range.start);
            let size = pretty_len(&items[range.clone()]);
            assert!(
                size <= max_bytes || range.len() == 1,
                "{range:?} is {size} bytes, limit {max_bytes}"
            );
            // greedy: the next record would not have fit
            if range.end < items.len() {
                assert!(pretty_len(&items[range.start..=range.end]) > max_bytes);
            }
            next = range.end;
        }
        assert_eq!(next, items.len());
    }

    #[test]
    fn test_estimate_matches_serialized_size() {
        let items = vec![
            EmailRecord::new("1", "plain", true),
            EmailRecord::new("2", "quote \" and \\ and\nnewline\ttab", false),
            EmailRecord::new("3", "héllo wörld ✉", true),
            EmailRecord::new("4", "", false),
        ];
        for max in 0..pretty_len(&items) + 10 {
            let prefix = Path::new("p");
            let est = plan_chunks(&items, max, ChunkStrategy::Estimate, prefix).unwrap();
            let full = plan_chunks(&items, max, ChunkStrategy::Reserialize, prefix).unwrap();
            assert_eq!(est, full, "limit {max}");
            check_plan(&items, max, &est);
        }
    }

    #[test]
    fn test_strategies_agree_on_random_sizes() {
        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<EmailRecord> = (0..60).map(|i| record(i, rng.gen_range(0..900))).collect();
        for max in [1, 200, 1024, 3000, 10_000, usize::MAX] {
            let prefix = Path::new("p");
            let est = plan_chunks(&items, max, ChunkStrategy::Estimate, prefix).unwrap();
            let full = plan_chunks(&items, max, ChunkStrategy::Reserialize, prefix).unwrap();
            assert_eq!(est, full, "limit {max}");
            check_plan(&items, max, &est);
        }
    }

    #[test]
    fn test_two_per_chunk_gives_two_two_one() {
        let items: Vec<EmailRecord> = (0..5).map(|i| record(i, 380)).collect();
        assert!(pretty_len(&items[..2]) <= BYTES_PER_KB);
        assert!(pretty_len(&items[..3]) > BYTES_PER_KB);

        let dir = tempdir().unwrap();
        let prefix = dir.path().join("Learn");
        let written = write_chunked(&prefix, &items, 1, ChunkStrategy::Estimate).unwrap();

        let counts: Vec<usize> = written.iter().map(|w| w.records).collect();
        assert_eq!(counts, [2, 2, 1]);
        assert_eq!(written[2].path, dir.path().join("Learn_3.json"));
        assert!(!dir.path().join("Learn_4.json").exists());
    }

    #[test]
    fn test_chunks_reassemble_to_input() {
        let mut rng = StdRng::seed_from_u64(5);
        let items: Vec<EmailRecord> = (0..40).map(|i| record(i, rng.gen_range(10..1500))).collect();

        let dir = tempdir().unwrap();
        let prefix = dir.path().join("Learn");
        let written = write_chunked(&prefix, &items, 2, ChunkStrategy::Reserialize).unwrap();
        assert!(written.len() > 1);

        let mut rebuilt: Vec<EmailRecord> = Vec::new();
        for (idx, file) in written.iter().enumerate() {
            assert_eq!(file.path, chunk_path(&prefix, idx + 1));
            let raw = fs::read(&file.path).unwrap();
            assert_eq!(raw.len(), file.bytes);
            assert!(raw.len() <= 2 * BYTES_PER_KB || file.records == 1);
            let part: Vec<EmailRecord> = serde_json::from_slice(&raw).unwrap();
            assert_eq!(part.len(), file.records);
            rebuilt.extend(part);
        }
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn test_oversized_record_is_written_alone() {
        let items = vec![record(0, 10), record(1, 5000), record(2, 10)];
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("Learn");
        let written = write_chunked(&prefix, &items, 1, ChunkStrategy::Estimate).unwrap();

        let counts: Vec<usize> = written.iter().map(|w| w.records).collect();
        assert_eq!(counts, [1, 1, 1]);
        assert!(written[1].bytes > BYTES_PER_KB);
        let middle: Vec<EmailRecord> =
            serde_json::from_slice(&fs::read(&written[1].path).unwrap()).unwrap();
        assert_eq!(middle, vec![items[1].clone()]);
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("Learn");
        let written =
            write_chunked::<EmailRecord>(&prefix, &[], 1, ChunkStrategy::Estimate).unwrap();
        assert!(written.is_empty());
        assert!(!chunk_path(&prefix, 1).exists());
    }

    #[test]
    fn test_write_json_uses_two_space_indent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.json");
        let items = vec![EmailRecord::new("1", "a@x", true)];
        let views: Vec<_> = items.iter().map(EmailRecord::label_view).collect();
        let file = write_json(&path, &views).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[\n  {\n    \"id\": \"1\",\n    \"phish\": true\n  }\n]");
        assert_eq!(file.bytes, text.len());
        assert_eq!(file.records, 1);
    }

    #[test]
    fn test_write_failure_names_chunk() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("missing").join("Learn");
        let items = vec![record(0, 10)];
        match write_chunked(&prefix, &items, 1, ChunkStrategy::Estimate) {
            Err(ConvertError::Write {
                target: OutputTarget::Chunk { number, path },
                ..
            }) => {
                assert_eq!(number, 1);
                assert_eq!(path, chunk_path(&prefix, 1));
            }
            other => panic!("expected chunk write error, got {other:?}"),
        }
    }

    #[test]
    fn test_chunk_path_appends_number() {
        assert_eq!(
            chunk_path(Path::new("out/Phishing_Learning_Data"), 12),
            PathBuf::from("out/Phishing_Learning_Data_12.json")
        );
    }
}
