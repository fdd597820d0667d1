//!
//! Analysis session state.
//!
use crate::metric::Metric;
use crate::ranking::{rank, Leaderboard};
use crate::record::Dataset;
use crate::relay::{Conversation, RelayClient, Reply};
use crate::{scoring, table, Result};

/// Everything one analysis session works on: the loaded measurements, the
/// metric being compared and the question transcript.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Dataset,
    metric: Metric,
    conversation: Conversation,
}

impl Session {
    /// Empty session comparing completion time
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded measurements with those parsed from `raw_text`.
    ///
    /// The transcript is kept. Returns the number of records loaded.
    pub fn load(&mut self, raw_text: &str) -> usize {
        self.replace_dataset(table::ingest(raw_text))
    }

    /// Replace the loaded measurements
    pub fn replace_dataset(&mut self, dataset: Dataset) -> usize {
        tracing::info!(
            "session loaded {} records for {} hosts",
            dataset.len(),
            dataset.hosts().len()
        );
        self.dataset = dataset;
        self.dataset.len()
    }

    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn select_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    #[must_use]
    pub const fn selected_metric(&self) -> Metric {
        self.metric
    }

    /// Ranking of all hosts by the selected metric
    #[must_use]
    pub fn leaderboard(&self) -> Leaderboard {
        rank(&self.dataset, self.metric)
    }

    /// Score of one host for the selected metric
    #[must_use]
    pub fn score(&self, host_id: &str) -> f64 {
        scoring::score(&self.dataset, self.metric, host_id)
    }

    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Ask the answering service about the loaded measurements
    pub async fn ask(&mut self, relay: &RelayClient, question: &str) -> Result<Reply> {
        relay
            .ask(&self.dataset, &mut self.conversation, question)
            .await
    }
}
