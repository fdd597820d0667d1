//!
//! Reading and writing the canonical measurement table.
//!
//! The table is comma delimited text with a header row. String columns are
//! always quoted on output, with inner quotes doubled; numbers are written
//! plain.
use std::fmt::Write;

use crate::record::{Dataset, MeasurementRecord, COLUMNS};
use crate::{Error, Result};

mod reader;

use reader::{Row, Rows};

/// Parse measurement text into a [`Dataset`].
///
/// Parsing never fails as a whole: rows without a timestamp or with broken
/// quoting are dropped, missing columns read as absent and unparseable
/// numbers read as 0.
#[must_use]
pub fn ingest(raw_text: &str) -> Dataset {
    let text = raw_text.strip_prefix('\u{feff}').unwrap_or(raw_text);
    let mut rows = Rows::new(text);

    let header = loop {
        match rows.next() {
            None => return Dataset::new(),
            Some(Ok(row)) if row.is_blank() => {}
            Some(Ok(row)) => break Header::new(&row),
            Some(Err(e)) => {
                tracing::debug!("{}", e);
                return Dataset::new();
            }
        }
    };

    let mut records = Vec::new();
    let mut dropped = 0_usize;
    for row in rows {
        match row.and_then(|row| header.record(&row)) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("dropping row: {}", e);
                dropped += 1;
            }
        }
    }

    tracing::info!(
        "ingested {} measurement rows, dropped {}",
        records.len(),
        dropped
    );
    Dataset::from(records)
}

/// Write a [`Dataset`] as canonical measurement text
#[must_use]
pub fn serialize(dataset: &Dataset) -> String {
    let mut out = COLUMNS.join(",");
    for r in dataset {
        out.push('\n');
        push_string(&mut out, &r.timestamp);
        out.push(',');
        push_string(&mut out, &r.host_id);
        for value in [
            r.cpu_usage_percentage,
            r.memory_usage_mb,
            r.network_received_mb,
            r.network_sent_mb,
            r.disk_read_mb,
            r.disk_write_mb,
            r.runtime_seconds,
            r.code_execution_time_seconds,
        ] {
            let _ = write!(out, ",{value}");
        }
    }
    out
}

fn push_string(out: &mut String, value: &str) {
    out.push('"');
    out.push_str(&value.replace('"', "\"\""));
    out.push('"');
}

/// Column positions of the known fields, `None` when the header lacks one
struct Header {
    index: [Option<usize>; COLUMNS.len()],
}

impl Header {
    fn new(row: &Row) -> Self {
        let mut index = [None; COLUMNS.len()];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = row.fields.iter().position(|f| f.trim() == name);
            if slot.is_none() {
                tracing::debug!("measurement header lacks column {}", name);
            }
        }
        Self { index }
    }

    fn field<'r>(&self, row: &'r Row, col: usize) -> Option<&'r str> {
        self.index[col]
            .and_then(|i| row.fields.get(i))
            .map(String::as_str)
    }

    fn number(&self, row: &Row, col: usize) -> f64 {
        let Some(raw) = self.field(row, col) else {
            return 0.0;
        };
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => {
                if !raw.is_empty() {
                    tracing::debug!(
                        "line {}: {} value {:?} read as 0",
                        row.line,
                        COLUMNS[col],
                        raw
                    );
                }
                0.0
            }
        }
    }

    /// `Ok(None)` for blank lines
    fn record(&self, row: &Row) -> Result<Option<MeasurementRecord>> {
        if row.is_blank() {
            return Ok(None);
        }

        let timestamp = match self.field(row, 0) {
            Some(ts) if !ts.trim().is_empty() => ts.to_string(),
            _ => {
                return Err(Error::MalformedRow {
                    line: row.line,
                    reason: "missing timestamp".into(),
                })
            }
        };

        Ok(Some(MeasurementRecord {
            timestamp,
            host_id: self.field(row, 1).unwrap_or_default().to_string(),
            cpu_usage_percentage: self.number(row, 2),
            memory_usage_mb: self.number(row, 3),
            network_received_mb: self.number(row, 4),
            network_sent_mb: self.number(row, 5),
            disk_read_mb: self.number(row, 6),
            disk_write_mb: self.number(row, 7),
            runtime_seconds: self.number(row, 8),
            code_execution_time_seconds: self.number(row, 9),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{ingest, serialize};
    use crate::record::{Dataset, MeasurementRecord};

    const HEADER: &str = "timestamp,container_name,cpu_usage_percentage,memory_usage_mb,network_received_mb,network_sent_mb,disk_read_mb,disk_write_mb,runtime_seconds,code_execution_time_seconds";

    fn record(host: &str, exec: f64) -> MeasurementRecord {
        MeasurementRecord {
            timestamp: "2024-11-02 12:00:00".into(),
            host_id: host.into(),
            cpu_usage_percentage: 12.5,
            memory_usage_mb: 48.25,
            network_received_mb: 0.01,
            network_sent_mb: 0.0,
            disk_read_mb: 3.0,
            disk_write_mb: 1.5,
            runtime_seconds: 20.0,
            code_execution_time_seconds: exec,
        }
    }

    #[test]
    fn drops_rows_with_missing_timestamp() {
        let text = format!(
            "{HEADER}\n2024-11-02 12:00:00,Ubuntu20.04,1,2,3,4,5,6,7,8\n,Debian11,1,2,3,4,5,6,7,8\n"
        );
        let ds = ingest(&text);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].host_id, "Ubuntu20.04");
        assert_eq!(ds.records()[0].code_execution_time_seconds, 8.0);
    }

    #[test]
    fn coerces_bad_numbers_to_zero() {
        let text = format!("{HEADER}\nt,h,abc,-4,,NaN,inf,5,6,7");
        let ds = ingest(&text);
        let r = &ds.records()[0];
        assert_eq!(r.cpu_usage_percentage, 0.0);
        assert_eq!(r.memory_usage_mb, 0.0);
        assert_eq!(r.network_received_mb, 0.0);
        assert_eq!(r.network_sent_mb, 0.0);
        assert_eq!(r.disk_read_mb, 0.0);
        assert_eq!(r.disk_write_mb, 5.0);
    }

    #[test]
    fn header_order_and_missing_columns() {
        let text = "container_name,extra,code_execution_time_seconds,timestamp\r\n\
                    Debian11,x,2.5,2024-11-02\r\n";
        let ds = ingest(text);
        let r = &ds.records()[0];
        assert_eq!(r.host_id, "Debian11");
        assert_eq!(r.code_execution_time_seconds, 2.5);
        assert_eq!(r.timestamp, "2024-11-02");
        assert_eq!(r.memory_usage_mb, 0.0);
    }

    #[test]
    fn missing_timestamp_column_drops_everything() {
        let ds = ingest("container_name,cpu_usage_percentage\nUbuntu20.04,5\n");
        assert!(ds.is_empty());
    }

    #[test]
    fn empty_and_header_only_input() {
        assert!(ingest("").is_empty());
        assert!(ingest("\n\n").is_empty());
        assert!(ingest(HEADER).is_empty());
    }

    #[test]
    fn bom_and_short_rows() {
        let text = format!("\u{feff}{HEADER}\n2024-11-02,Ubuntu20.04,7");
        let ds = ingest(&text);
        let r = &ds.records()[0];
        assert_eq!(r.cpu_usage_percentage, 7.0);
        assert_eq!(r.runtime_seconds, 0.0);
    }

    #[test]
    fn serializes_with_quoted_strings() {
        let ds = Dataset::from(vec![record("Ubuntu20.04", 1.0)]);
        let text = serialize(&ds);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("\"2024-11-02 12:00:00\",\"Ubuntu20.04\",12.5,48.25,0.01,0,3,1.5,20,1")
        );
        assert_eq!(lines.next(), None);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn round_trip() {
        let ds = Dataset::from(vec![record("Ubuntu20.04", 1.0), record("Debian11", 2.75)]);
        assert_eq!(ingest(&serialize(&ds)), ds);
    }

    #[test]
    fn round_trip_embedded_quotes_and_delimiters() {
        let ds = Dataset::from(vec![
            record("my \"special\" image", 0.5),
            record("a,b", 1.0),
            record("\"", 1.0),
        ]);
        let back = ingest(&serialize(&ds));
        assert_eq!(back.records()[0].host_id, "my \"special\" image");
        assert_eq!(back.records()[1].host_id, "a,b");
        assert_eq!(back.records()[2].host_id, "\"");
        assert_eq!(back, ds);
    }

    #[test]
    fn unterminated_quote_drops_only_that_row() {
        let text = format!("{HEADER}\n2024,Ubuntu20.04,1\n2024,\"broken,2");
        assert_eq!(ingest(&text).len(), 1);
    }
}
