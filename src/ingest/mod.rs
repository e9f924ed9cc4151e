//! Per-day log ingestion
//!
//! Builds [`Dataset`](crate::types::Dataset) values from the three on-disk
//! sources:
//!
//! - HPC polling CSVs, one file per day named `YYYY-MM-DD.csv`;
//! - the enterprise-equipment log (`ENT*` files, amps at a fixed voltage);
//! - the UPS trendlog (`UPS*` files, watts out).
//!
//! Files are discovered by name, supplied in ascending date order, and rows
//! are consumed as header-keyed CSV records. ENT and UPS availability is
//! probed from the final file's last data line; a source whose log ends
//! before the requested range starts is treated as missing (empty dataset
//! plus a disclaimer), never as an error.

pub mod discovery;
pub mod enterprise;
pub mod hpc;
pub mod timefmt;
pub mod ups;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Dataset;

/// Errors raised while reading or decoding log files. These abort the
/// request; availability problems are handled with disclaimers instead.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column {column:?} missing from {path:?}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("unparseable timestamp {value:?} (accepted formats: {tried})")]
    Timestamp { value: String, tried: String },
}

/// One loaded secondary source: the dataset (possibly empty) plus the
/// availability disclaimer to surface on the chart, if any.
#[derive(Debug, Default)]
pub struct SourceData {
    pub dataset: Dataset,
    pub disclaimer: Option<String>,
}

/// Last non-empty line of a file, for the availability probes.
fn last_data_line(path: &Path) -> Result<String, IngestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default()
        .to_string())
}

/// Numeric field helper: the sources occasionally carry blanks or garbage in
/// value columns, which are read as `0.0` rather than failing the run.
fn lenient_f64(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn last_data_line_skips_trailing_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "a,b,c").expect("write");
        writeln!(file, "1,2,3").expect("write");
        writeln!(file).expect("write");
        let line = last_data_line(file.path()).expect("probe");
        assert_eq!(line, "1,2,3");
    }

    #[test]
    fn lenient_values_default_to_zero() {
        assert_eq!(lenient_f64(Some("4.25")), 4.25);
        assert_eq!(lenient_f64(Some(" 7 ")), 7.0);
        assert_eq!(lenient_f64(Some("n/a")), 0.0);
        assert_eq!(lenient_f64(None), 0.0);
    }
}
