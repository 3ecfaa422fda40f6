//! Fundamental types shared across the benchmark pipeline.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Identifier of one benchmark workload corpus (e.g. `small`, `big`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(String);

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dataset {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Scheduler identifier understood by the external workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchedulerId(String);

impl SchedulerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchedulerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchedulerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identifies exactly one workload invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfiguration {
    pub dataset: Dataset,
    pub scheduler: SchedulerId,
    pub thread_count: usize,
    pub repetition: usize,
}

impl BenchmarkConfiguration {
    pub fn new(
        dataset: Dataset,
        scheduler: SchedulerId,
        thread_count: usize,
        repetition: usize,
    ) -> Self {
        Self {
            dataset,
            scheduler,
            thread_count,
            repetition,
        }
    }

    /// Positional arguments passed to the workload: dataset, scheduler, threads.
    pub fn workload_args(&self) -> Vec<String> {
        vec![
            self.dataset.to_string(),
            self.scheduler.to_string(),
            self.thread_count.to_string(),
        ]
    }
}

impl fmt::Display for BenchmarkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dataset={} scheduler={} threads={} repetition={}",
            self.dataset, self.scheduler, self.thread_count, self.repetition
        )
    }
}

/// One measured elapsed time. Never mutated after the runner produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    pub configuration: BenchmarkConfiguration,
    pub elapsed_secs: f64,
}

/// Dataset-keyed map that keeps datasets in insertion order.
///
/// Chart legends and printed tables follow the configured dataset order,
/// which a hash or B-tree map would not preserve.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMap<T> {
    entries: Vec<(Dataset, T)>,
}

impl<T> DatasetMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, dataset: &Dataset) -> Option<&T> {
        self.entries
            .iter()
            .find(|(d, _)| d == dataset)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, dataset: &Dataset) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(d, _)| d == dataset)
            .map(|(_, v)| v)
    }

    /// Insert a value, replacing (in place) any existing value for the dataset.
    pub fn insert(&mut self, dataset: Dataset, value: T) -> Option<T> {
        match self.get_mut(&dataset) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((dataset, value));
                None
            }
        }
    }

    pub fn get_or_insert_default(&mut self, dataset: &Dataset) -> &mut T
    where
        T: Default,
    {
        let index = match self.entries.iter().position(|(d, _)| d == dataset) {
            Some(index) => index,
            None => {
                self.entries.push((dataset.clone(), T::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dataset, &T)> {
        self.entries.iter().map(|(d, v)| (d, v))
    }

    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.entries.iter().map(|(d, _)| d)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for DatasetMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Dataset, T)> for DatasetMap<T> {
    fn from_iter<I: IntoIterator<Item = (Dataset, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (dataset, value) in iter {
            map.insert(dataset, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for DatasetMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (dataset, value) in &self.entries {
            map.serialize_entry(dataset.as_str(), value)?;
        }
        map.end()
    }
}

/// Raw samples per dataset, ordered by (repetition, thread-count index).
pub type RawTimingSeries = DatasetMap<Vec<TimingSample>>;

/// Mean elapsed seconds per dataset, one entry per thread count.
pub type AveragedSeries = DatasetMap<Vec<f64>>;

/// Mean sequential elapsed seconds per dataset.
pub type BaselineMap = DatasetMap<f64>;

/// Speedup ratio per dataset, one entry per thread count.
pub type SpeedupSeries = DatasetMap<Vec<f64>>;
