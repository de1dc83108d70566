use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ConvertError, Result};
use crate::record::EmailRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    Training,
    Testing,
    Learning,
}

/// Disjoint training / testing / learning split of a dataset. Each subset
/// keeps the original dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub training: Vec<EmailRecord>,
    pub testing: Vec<EmailRecord>,
    pub learning: Vec<EmailRecord>,
}

/// Decide which subset every index in `0..total` belongs to.
///
/// A uniform permutation of the indices is drawn; its first `train_count`
/// entries go to training, the next `test_count` to testing and the rest to
/// learning. At least one record must be left for learning.
pub fn assign_subsets<R: Rng + ?Sized>(
    total: usize,
    train_count: usize,
    test_count: usize,
    rng: &mut R,
) -> Result<Vec<Subset>> {
    let held_out = train_count
        .checked_add(test_count)
        .filter(|&n| n < total)
        .ok_or(ConvertError::InsufficientData {
            train: train_count,
            test: test_count,
            total,
        })?;

    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let mut assignment = vec![Subset::Learning; total];
    for &idx in &order[..train_count] {
        assignment[idx] = Subset::Training;
    }
    for &idx in &order[train_count..held_out] {
        assignment[idx] = Subset::Testing;
    }
    Ok(assignment)
}

/// Split `records` into training, testing and learning subsets.
pub fn partition<R: Rng + ?Sized>(
    records: Vec<EmailRecord>,
    train_count: usize,
    test_count: usize,
    rng: &mut R,
) -> Result<Partition> {
    let total = records.len();
    let assignment = assign_subsets(total, train_count, test_count, rng)?;

    let mut out = Partition {
        training: Vec::with_capacity(train_count),
        testing: Vec::with_capacity(test_count),
        learning: Vec::with_capacity(total - train_count - test_count),
    };
    for (record, subset) in records.into_iter().zip(assignment) {
        match subset {
            Subset::Training => out.training.push(record),
            Subset::Testing => out.testing.push(record),
            Subset::Learning => out.learning.push(record),
        }
    }

    info!(
        "Split {} records: training={} testing={} learning={}",
        total,
        out.training.len(),
        out.testing.len(),
        out.learning.len()
    );
    Ok(out)
}
