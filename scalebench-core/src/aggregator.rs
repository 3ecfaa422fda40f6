//! Reduces repeated timing samples into per-configuration means.
//!
//! All functions here are pure: inputs are borrowed immutably and the same
//! inputs always produce the same outputs.

use crate::error::AggregateError;
use crate::types::{AveragedSeries, BaselineMap, RawTimingSeries, TimingSample};

/// Average `repetitions` contiguous blocks of `width` samples element-wise.
///
/// `avg[i] = (raw[i] + raw[i + width] + ... ) / repetitions`.
pub fn average_samples(
    raw: &[f64],
    width: usize,
    repetitions: usize,
) -> Result<Vec<f64>, AggregateError> {
    if repetitions == 0 {
        return Err(AggregateError::ZeroRepetitions);
    }
    if width == 0 {
        return Err(AggregateError::EmptyThreadCounts);
    }
    let expected = width * repetitions;
    if raw.len() != expected {
        return Err(AggregateError::LengthMismatch {
            expected,
            actual: raw.len(),
        });
    }

    Ok((0..width)
        .map(|i| {
            let total: f64 = (0..repetitions).map(|k| raw[i + k * width]).sum();
            total / repetitions as f64
        })
        .collect())
}

fn elapsed(samples: &[TimingSample]) -> Vec<f64> {
    samples.iter().map(|s| s.elapsed_secs).collect()
}

fn check_order(samples: &[TimingSample], thread_counts: &[usize]) -> Result<(), AggregateError> {
    if thread_counts.is_empty() {
        return Err(AggregateError::EmptyThreadCounts);
    }
    for (index, sample) in samples.iter().enumerate() {
        let expected = thread_counts[index % thread_counts.len()];
        let actual = sample.configuration.thread_count;
        if actual != expected {
            return Err(AggregateError::OutOfOrder {
                index,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Average a parallel sweep into one mean per thread count, per dataset.
pub fn average(
    raw: &RawTimingSeries,
    thread_counts: &[usize],
    repetitions: usize,
) -> Result<AveragedSeries, AggregateError> {
    let mut averaged = AveragedSeries::new();
    for (dataset, samples) in raw.iter() {
        let means = average_samples(&elapsed(samples), thread_counts.len(), repetitions)
            .and_then(|means| check_order(samples, thread_counts).map(|_| means))
            .map_err(|e| AggregateError::in_dataset(dataset.as_str(), e))?;
        averaged.insert(dataset.clone(), means);
    }
    Ok(averaged)
}

/// Reduce the sequential sweep to one mean elapsed time per dataset.
pub fn baseline(raw: &RawTimingSeries, repetitions: usize) -> Result<BaselineMap, AggregateError> {
    let mut baselines = BaselineMap::new();
    for (dataset, samples) in raw.iter() {
        let means = average_samples(&elapsed(samples), 1, repetitions)
            .map_err(|e| AggregateError::in_dataset(dataset.as_str(), e))?;
        baselines.insert(dataset.clone(), means[0]);
    }
    Ok(baselines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BenchmarkConfiguration, Dataset, SchedulerId};
    use pretty_assertions::assert_eq;

    fn samples(dataset: &str, thread_counts: &[usize], values: &[f64]) -> Vec<TimingSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &elapsed_secs)| TimingSample {
                configuration: BenchmarkConfiguration::new(
                    Dataset::new(dataset),
                    SchedulerId::new("pipeline"),
                    thread_counts[i % thread_counts.len()],
                    i / thread_counts.len(),
                ),
                elapsed_secs,
            })
            .collect()
    }

    #[test]
    fn test_average_samples_strided_mean() {
        let raw = [10.0, 20.0, 12.0, 22.0];
        assert_eq!(average_samples(&raw, 2, 2).unwrap(), vec![11.0, 21.0]);
    }

    #[test]
    fn test_average_samples_single_repetition_is_identity() {
        let raw = [3.0, 1.5, 0.25];
        assert_eq!(average_samples(&raw, 3, 1).unwrap(), raw.to_vec());
    }

    #[test]
    fn test_average_samples_rejects_bad_shape() {
        assert!(matches!(
            average_samples(&[1.0, 2.0, 3.0], 2, 2),
            Err(AggregateError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            average_samples(&[], 2, 0),
            Err(AggregateError::ZeroRepetitions)
        ));
        assert!(matches!(
            average_samples(&[], 0, 1),
            Err(AggregateError::EmptyThreadCounts)
        ));
    }

    #[test]
    fn test_average_series_per_dataset() {
        let threads = [2, 4];
        let mut raw = RawTimingSeries::new();
        raw.insert(
            Dataset::new("small"),
            samples("small", &threads, &[10.0, 20.0, 12.0, 22.0]),
        );
        raw.insert(
            Dataset::new("big"),
            samples("big", &threads, &[100.0, 50.0, 300.0, 70.0]),
        );

        let averaged = average(&raw, &threads, 2).unwrap();
        assert_eq!(averaged.get(&Dataset::new("small")), Some(&vec![11.0, 21.0]));
        assert_eq!(averaged.get(&Dataset::new("big")), Some(&vec![200.0, 60.0]));
    }

    #[test]
    fn test_average_reports_offending_dataset() {
        let threads = [2, 4];
        let mut raw = RawTimingSeries::new();
        raw.insert(
            Dataset::new("mixture"),
            samples("mixture", &threads, &[1.0, 2.0, 3.0]),
        );

        let err = average(&raw, &threads, 2).unwrap_err();
        assert!(err.to_string().starts_with("Dataset 'mixture'"));
    }

    #[test]
    fn test_average_detects_out_of_order_samples() {
        let mut raw = RawTimingSeries::new();
        raw.insert(
            Dataset::new("small"),
            samples("small", &[4, 2], &[1.0, 2.0, 3.0, 4.0]),
        );

        let err = average(&raw, &[2, 4], 2).unwrap_err();
        match err {
            AggregateError::InDataset { source, .. } => {
                assert!(matches!(*source, AggregateError::OutOfOrder { index: 0, .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_baseline_is_plain_mean_per_dataset() {
        let mut raw = RawTimingSeries::new();
        raw.insert(Dataset::new("small"), samples("small", &[1], &[40.0, 50.0, 60.0]));
        raw.insert(Dataset::new("big"), samples("big", &[1], &[190.0, 200.0, 210.0]));

        let baselines = baseline(&raw, 3).unwrap();
        assert_eq!(baselines.get(&Dataset::new("small")), Some(&50.0));
        assert_eq!(baselines.get(&Dataset::new("big")), Some(&200.0));
    }

    #[test]
    fn test_average_does_not_touch_input() {
        let threads = [2, 4];
        let mut raw = RawTimingSeries::new();
        raw.insert(
            Dataset::new("small"),
            samples("small", &threads, &[10.0, 20.0, 12.0, 22.0]),
        );
        let before = raw.clone();

        let first = average(&raw, &threads, 2).unwrap();
        let second = average(&raw, &threads, 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw, before);
    }
}
