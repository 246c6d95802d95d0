use crate::framework::{MAX_NODE_SCORE, MIN_NODE_SCORE};
use crate::types::NodeScore;

/// Stretch raw scores linearly onto `[MIN_NODE_SCORE, MAX_NODE_SCORE]`.
///
/// The highest raw score maps to the maximum and the lowest to the minimum.
/// When every score is equal there is nothing to rank by, and all of them
/// drop to the minimum.
pub fn normalize_scores(scores: &mut [NodeScore]) {
    let Some(highest) = scores.iter().map(|s| s.score).max() else {
        return;
    };
    let lowest = scores.iter().map(|s| s.score).min().unwrap_or(highest);

    let old_range = i128::from(highest) - i128::from(lowest);
    let new_range = i128::from(MAX_NODE_SCORE - MIN_NODE_SCORE);

    for node_score in scores.iter_mut() {
        node_score.score = if old_range == 0 {
            MIN_NODE_SCORE
        } else {
            let scaled =
                (i128::from(node_score.score) - i128::from(lowest)) * new_range / old_range;
            scaled as i64 + MIN_NODE_SCORE
        };
    }
}
