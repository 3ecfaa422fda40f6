//! Speedup ratios of averaged parallel times against the sequential baseline.

use crate::error::SpeedupError;
use crate::types::{AveragedSeries, BaselineMap, SpeedupSeries};

/// Decimal places kept in a speedup ratio.
pub const SPEEDUP_PRECISION: usize = 3;

/// Round the stored binary value (not `value * 10^places`) to `places`
/// decimals, ties to even: `0.0375` is stored as `0.03749...` and rounds down.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// `baseline / parallel` rounded to three places.
///
/// A parallel time of exactly zero means no meaningful speedup could be
/// measured and yields `0.0` rather than infinity.
pub fn speedup(baseline: f64, parallel: f64) -> f64 {
    if parallel == 0.0 {
        return 0.0;
    }
    round_to(baseline / parallel, SPEEDUP_PRECISION)
}

/// Apply `speedup` element-wise, holding each dataset's own baseline fixed.
pub fn speedup_series(
    averaged: &AveragedSeries,
    baselines: &BaselineMap,
) -> Result<SpeedupSeries, SpeedupError> {
    let mut series = SpeedupSeries::new();
    for (dataset, times) in averaged.iter() {
        let base = *baselines
            .get(dataset)
            .ok_or_else(|| SpeedupError::MissingBaseline {
                dataset: dataset.to_string(),
            })?;
        series.insert(
            dataset.clone(),
            times.iter().map(|&time| speedup(base, time)).collect(),
        );
    }
    Ok(series)
}
