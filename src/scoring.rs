//!
//! Direction corrected 0-100 scores.
//!
//! Every metric is "lower is better": the smallest raw value across the
//! dataset scores 100, the largest scores 0.
use crate::metric::Metric;
use crate::record::Dataset;

/// Spread of one metric over all records of a dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// `None` for an empty dataset
    #[must_use]
    pub fn of(dataset: &Dataset, metric: Metric) -> Option<Self> {
        dataset.iter().map(|r| metric.value(r)).fold(None, |acc, v| {
            Some(match acc {
                None => Self { min: v, max: v },
                Some(Self { min, max }) => Self {
                    min: min.min(v),
                    max: max.max(v),
                },
            })
        })
    }

    #[must_use]
    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    /// Score a raw value against this range.
    ///
    /// A range without spread scores every value 100.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn score(&self, raw: f64) -> f64 {
        if self.max == self.min {
            return 100.0;
        }
        ((self.max - raw) / self.spread() * 100.0).clamp(0.0, 100.0)
    }
}

/// Score of `host_id` for `metric`, from its first record in the dataset.
///
/// A host without records is scored as a raw value of 0.
#[must_use]
pub fn score(dataset: &Dataset, metric: Metric, host_id: &str) -> f64 {
    let Some(range) = MetricRange::of(dataset, metric) else {
        return 100.0;
    };
    let raw = dataset.first_for(host_id).map_or(0.0, |r| metric.value(r));
    range.score(raw)
}
