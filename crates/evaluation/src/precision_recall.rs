//! Precision and recall of one user's recommendations

use receval_core::{Error, ItemId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Precision and recall for one user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallResult {
    /// Share of recommended items found in the ground truth.
    /// `None` when nothing was recommended.
    pub precision: Option<f64>,
    /// Share of ground-truth items that were recommended
    pub recall: f64,
}

impl PrecisionRecallResult {
    /// Precision with the undefined case folded as zero
    pub fn precision_or_zero(&self) -> f64 {
        self.precision.unwrap_or(0.0)
    }
}

/// Score `recommended` against `ground_truth`
///
/// Both sides are treated as sets, so duplicate recommendations count once.
/// An empty ground truth is an invariant violation.
pub fn score(
    recommended: &[ItemId],
    ground_truth: &HashSet<ItemId>,
) -> Result<PrecisionRecallResult> {
    if ground_truth.is_empty() {
        return Err(Error::invariant(
            "ground truth is empty for a user in the snapshot",
        ));
    }

    let distinct: HashSet<ItemId> = recommended.iter().copied().collect();
    let hits = distinct.intersection(ground_truth).count();

    let precision = if distinct.is_empty() {
        None
    } else {
        Some(hits as f64 / distinct.len() as f64)
    };
    let recall = hits as f64 / ground_truth.len() as f64;

    Ok(PrecisionRecallResult { precision, recall })
}
