use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{PmaError, Result};
use crate::movement::{Horizon, MovementRecord};

/// A movement record with its 1-based position in the daily-move ordering.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RankedMovement {
    pub rank: usize,
    #[serde(flatten)]
    pub movement: MovementRecord,
}

/// Descending order on real numbers, NaN after all of them.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Sorts by 1-day move, biggest gainer first, and numbers the rows from 1.
///
/// The sort is stable, so equal moves keep their input order.
pub fn rank_by_daily_move(mut records: Vec<MovementRecord>) -> Vec<RankedMovement> {
    records.sort_by(|a, b| descending_nan_last(a.pct_1d, b.pct_1d));

    records
        .into_iter()
        .enumerate()
        .map(|(i, movement)| RankedMovement {
            rank: i + 1,
            movement,
        })
        .collect()
}

/// Rows that fell over every horizon. Ranks are carried over, not renumbered.
pub fn select_all_negative(ranked: &[RankedMovement]) -> Vec<RankedMovement> {
    // `NaN < 0.0` is false, so NaN rows never qualify.
    ranked
        .iter()
        .filter(|r| Horizon::ALL.iter().all(|h| r.movement.pct(*h) < 0.0))
        .cloned()
        .collect()
}

/// The first `n` ranked rows, or all of them if there are fewer.
pub fn select_top_n(ranked: &[RankedMovement], n: usize) -> Result<Vec<RankedMovement>> {
    validate_top_n(n)?;
    Ok(ranked.iter().take(n).cloned().collect())
}

pub fn validate_top_n(n: usize) -> Result<()> {
    if n == 0 {
        return Err(PmaError::InvalidParameter {
            name: "top_n",
            reason: "must be a positive integer".to_string(),
        });
    }
    Ok(())
}
