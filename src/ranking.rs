//!
//! Host leaderboards.
//!
use crate::metric::Metric;
use crate::record::Dataset;
use crate::scoring::MetricRange;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHost {
    /// 1-based, 1 is best
    pub rank: usize,
    pub host_id: String,
    /// 0-100, higher is better
    pub score: f64,
    /// Raw metric value of the representative sample
    pub raw: f64,
}

/// Hosts ordered by score for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    metric: Metric,
    entries: Vec<RankedHost>,
}

/// Rank every host of the dataset by `metric`.
///
/// Each host is represented by its first record. Hosts with equal scores keep
/// the order in which they first appear in the dataset.
#[must_use]
pub fn rank(dataset: &Dataset, metric: Metric) -> Leaderboard {
    let range = MetricRange::of(dataset, metric);

    let mut entries: Vec<RankedHost> = dataset
        .hosts()
        .into_iter()
        .filter_map(|host| dataset.first_for(host))
        .map(|record| {
            let raw = metric.value(record);
            RankedHost {
                rank: 0,
                host_id: record.host_id.clone(),
                score: range.map_or(100.0, |r| r.score(raw)),
                raw,
            }
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    Leaderboard { metric, entries }
}

impl Leaderboard {
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub fn entries(&self) -> &[RankedHost] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The best `n` hosts
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedHost] {
        &self.entries[..n.min(self.entries.len())]
    }

    #[must_use]
    pub fn winner(&self) -> Option<&RankedHost> {
        self.entries.first()
    }

    /// Rank of `host_id`, if it's on the board
    #[must_use]
    pub fn position(&self, host_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.host_id == host_id)
            .map(|e| e.rank)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedHost> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a RankedHost;
    type IntoIter = std::slice::Iter<'a, RankedHost>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = self.metric.unit();
        writeln!(f, "{}", self.metric.label())?;
        let width = self
            .entries
            .iter()
            .map(|e| e.host_id.chars().count())
            .max()
            .unwrap_or(0);
        for e in &self.entries {
            writeln!(
                f,
                "{:>3}  {:<width$}  {:>5.1}  {}{}",
                e.rank, e.host_id, e.score, e.raw, unit
            )?;
        }
        Ok(())
    }
}
