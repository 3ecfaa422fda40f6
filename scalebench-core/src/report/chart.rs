//! Chart specifications.
//!
//! Describes the data a speedup chart must encode, independent of how the
//! figure renderer lays it out.

use crate::error::ReportError;
use crate::types::{SchedulerId, SpeedupSeries};
use serde::{Deserialize, Serialize};

/// Line colors assigned to datasets in order.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Line chart specification: shared x values, one line per dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// X positions, also used as tick marks.
    pub x_values: Vec<f64>,
    pub datasets: Vec<ChartDataset>,
}

/// A single line in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ChartSpec {
    /// Speedup against thread count, one line per dataset in series order.
    pub fn speedup(
        scheduler: &SchedulerId,
        thread_counts: &[usize],
        speedups: &SpeedupSeries,
    ) -> Self {
        let datasets = speedups
            .iter()
            .enumerate()
            .map(|(i, (dataset, data))| ChartDataset {
                label: dataset.to_string(),
                data: data.clone(),
                color: Some(PALETTE[i % PALETTE.len()].to_string()),
            })
            .collect();

        Self {
            title: format!("Speedup ({})", scheduler),
            x_label: "Number of Threads (n)".into(),
            y_label: "Speedup".into(),
            x_values: thread_counts.iter().map(|&n| n as f64).collect(),
            datasets,
        }
    }

    /// Every line must have exactly one finite value per x position.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.x_values.is_empty() {
            return Err(ReportError::InvalidChart {
                reason: "chart has no x values".into(),
            });
        }
        if self.x_values.iter().any(|x| !x.is_finite()) {
            return Err(ReportError::InvalidChart {
                reason: "x values must be finite".into(),
            });
        }
        for dataset in &self.datasets {
            if dataset.data.len() != self.x_values.len() {
                return Err(ReportError::InvalidChart {
                    reason: format!(
                        "dataset '{}' has {} points for {} x values",
                        dataset.label,
                        dataset.data.len(),
                        self.x_values.len()
                    ),
                });
            }
            if dataset.data.iter().any(|y| !y.is_finite()) {
                return Err(ReportError::InvalidChart {
                    reason: format!("dataset '{}' contains a non-finite value", dataset.label),
                });
            }
        }
        Ok(())
    }

    /// Largest y value across all datasets (0 when there is none).
    pub fn y_max(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Smallest and largest x value.
    pub fn x_range(&self) -> (f64, f64) {
        let min = self.x_values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .x_values
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dataset;

    fn series() -> SpeedupSeries {
        [
            (Dataset::new("small"), vec![1.5, 2.0]),
            (Dataset::new("big"), vec![1.9, 3.6]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_speedup_chart_one_line_per_dataset() {
        let spec = ChartSpec::speedup(&SchedulerId::new("pipeline"), &[2, 4], &series());
        assert_eq!(spec.title, "Speedup (pipeline)");
        assert_eq!(spec.x_values, vec![2.0, 4.0]);
        let labels: Vec<&str> = spec.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["small", "big"]);
        assert_eq!(spec.datasets[1].color.as_deref(), Some(PALETTE[1]));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let spec = ChartSpec::speedup(&SchedulerId::new("pipeline"), &[2, 4, 8], &series());
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("'small' has 2 points for 3 x values"));
    }

    #[test]
    fn test_validate_rejects_empty_x() {
        let spec = ChartSpec::speedup(&SchedulerId::new("pipeline"), &[], &SpeedupSeries::new());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_ranges() {
        let spec = ChartSpec::speedup(&SchedulerId::new("pipeline"), &[2, 4], &series());
        assert_eq!(spec.y_max(), 3.6);
        assert_eq!(spec.x_range(), (2.0, 4.0));
    }

    #[test]
    fn test_chart_spec_serialization() {
        let spec = ChartSpec::speedup(&SchedulerId::new("bsp"), &[2], &SpeedupSeries::new());
        let json = serde_json::to_string(&spec).unwrap();
        let restored: ChartSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spec);
    }
}
