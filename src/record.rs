//!
//! Measurement records and the dataset holding them.
//!
use chrono::{DateTime, NaiveDateTime};

/// Column order of the canonical measurement table
pub const COLUMNS: [&str; 10] = [
    "timestamp",
    "container_name",
    "cpu_usage_percentage",
    "memory_usage_mb",
    "network_received_mb",
    "network_sent_mb",
    "disk_read_mb",
    "disk_write_mb",
    "runtime_seconds",
    "code_execution_time_seconds",
];

/// One sample for one host at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementRecord {
    /// Sample time as written by the producer, never empty in a [`Dataset`]
    pub timestamp: String,
    /// Host environment, `container_name` in the table
    pub host_id: String,
    pub cpu_usage_percentage: f64,
    pub memory_usage_mb: f64,
    pub network_received_mb: f64,
    pub network_sent_mb: f64,
    pub disk_read_mb: f64,
    pub disk_write_mb: f64,
    pub runtime_seconds: f64,
    pub code_execution_time_seconds: f64,
}

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl MeasurementRecord {
    /// Parsed sample time, `None` if the timestamp isn't in a known format.
    /// Offsets are normalized to UTC.
    #[must_use]
    pub fn time(&self) -> Option<NaiveDateTime> {
        let ts = self.timestamp.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(ts) {
            return Some(t.naive_utc());
        }
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
    }
}

/// Ordered, immutable set of measurement records.
///
/// A new dataset is produced on every ingestion; nothing mutates an existing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<MeasurementRecord>,
}

impl Dataset {
    /// Empty dataset
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasurementRecord> {
        self.records.iter()
    }

    /// Distinct host ids in the order they first appear
    #[must_use]
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = Vec::new();
        for r in &self.records {
            if !hosts.contains(&r.host_id.as_str()) {
                hosts.push(&r.host_id);
            }
        }
        hosts
    }

    /// First record for `host_id` in dataset order.
    ///
    /// This is the sample used for scoring and ranking, later samples of the
    /// same host are ignored there.
    #[must_use]
    pub fn first_for(&self, host_id: &str) -> Option<&MeasurementRecord> {
        self.records.iter().find(|r| r.host_id == host_id)
    }

    /// Most recent record for `host_id`.
    ///
    /// Records whose timestamp doesn't parse sort before all others; among
    /// equal times the later one in dataset order wins.
    #[must_use]
    pub fn latest_for(&self, host_id: &str) -> Option<&MeasurementRecord> {
        self.records
            .iter()
            .filter(|r| r.host_id == host_id)
            .max_by_key(|r| r.time())
    }
}

impl From<Vec<MeasurementRecord>> for Dataset {
    /// Builds a dataset, dropping records without a timestamp
    fn from(records: Vec<MeasurementRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| !r.timestamp.trim().is_empty())
            .collect();
        Self { records }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a MeasurementRecord;
    type IntoIter = std::slice::Iter<'a, MeasurementRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
