//!
//! Catalog of the selectable metrics.
//!
use crate::record::MeasurementRecord;
use crate::{Error, Result};

/// One of the eight measured quantities of a [`MeasurementRecord`].
///
/// Every metric is treated as "lower is better" when scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    /// `cpu_usage_percentage`
    CpuUsage,
    /// `memory_usage_mb`
    MemoryUsage,
    /// `network_received_mb`
    NetworkReceived,
    /// `network_sent_mb`
    NetworkSent,
    /// `disk_read_mb`
    DiskRead,
    /// `disk_write_mb`
    DiskWrite,
    /// `runtime_seconds`
    Runtime,
    /// `code_execution_time_seconds`
    #[default]
    CodeExecutionTime,
}

/// Static metadata for a [`Metric`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Column name in the measurement table
    pub key: &'static str,
    /// Human readable name
    pub label: &'static str,
    /// Unit suffix, empty when unitless
    pub unit: &'static str,
}

impl Metric {
    /// All metrics, in table column order
    pub const ALL: [Self; 8] = [
        Self::CpuUsage,
        Self::MemoryUsage,
        Self::NetworkReceived,
        Self::NetworkSent,
        Self::DiskRead,
        Self::DiskWrite,
        Self::Runtime,
        Self::CodeExecutionTime,
    ];

    /// Column name in the measurement table
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CpuUsage => "cpu_usage_percentage",
            Self::MemoryUsage => "memory_usage_mb",
            Self::NetworkReceived => "network_received_mb",
            Self::NetworkSent => "network_sent_mb",
            Self::DiskRead => "disk_read_mb",
            Self::DiskWrite => "disk_write_mb",
            Self::Runtime => "runtime_seconds",
            Self::CodeExecutionTime => "code_execution_time_seconds",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CpuUsage => "CPU Usage",
            Self::MemoryUsage => "Memory Usage",
            Self::NetworkReceived => "Network Received",
            Self::NetworkSent => "Network Sent",
            Self::DiskRead => "Disk Read",
            Self::DiskWrite => "Disk Write",
            Self::Runtime => "Runtime",
            Self::CodeExecutionTime => "Completion Time",
        }
    }

    /// Unit derived from the column name
    #[must_use]
    pub fn unit(self) -> &'static str {
        unit_for_key(self.key())
    }

    #[must_use]
    pub fn descriptor(self) -> MetricDescriptor {
        MetricDescriptor {
            key: self.key(),
            label: self.label(),
            unit: self.unit(),
        }
    }

    /// Extract this metric's raw value from a record
    #[must_use]
    pub fn value(self, record: &MeasurementRecord) -> f64 {
        match self {
            Self::CpuUsage => record.cpu_usage_percentage,
            Self::MemoryUsage => record.memory_usage_mb,
            Self::NetworkReceived => record.network_received_mb,
            Self::NetworkSent => record.network_sent_mb,
            Self::DiskRead => record.disk_read_mb,
            Self::DiskWrite => record.disk_write_mb,
            Self::Runtime => record.runtime_seconds,
            Self::CodeExecutionTime => record.code_execution_time_seconds,
        }
    }

    /// Look up a metric by its column name
    pub fn from_key(key: &str) -> Result<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| Error::UnknownMetric(key.to_string()))
    }
}

impl std::str::FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit naming convention: "percentage" is `%`, "mb" is `MB`, "seconds" is `s`.
#[must_use]
pub fn unit_for_key(key: &str) -> &'static str {
    if key.contains("percentage") {
        "%"
    } else if key.contains("mb") {
        "MB"
    } else if key.contains("seconds") {
        "s"
    } else {
        ""
    }
}
