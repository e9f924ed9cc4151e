//! Timestamp formats
//!
//! Each source stamps rows in local wall-clock with its own conventions, and
//! year width varies within one log. Parsing tries an explicit ordered list
//! of formats and returns the first success; exhausting the list is a typed
//! error. Conversion to epoch seconds uses the system timezone, matching how
//! the logs were written; daylight saving transitions are not corrected.

use chrono::{Local, NaiveDateTime};

use super::IngestError;

/// Enterprise log `Time` column, e.g. `1/04/24 12:05:30 AM EST`. The zone
/// abbreviation is dropped before parsing.
pub const ENTERPRISE_FORMATS: &[&str] = &["%m/%d/%y %I:%M:%S %p", "%m/%d/%Y %I:%M:%S %p"];

/// UPS trendlog `Date` + `Time` columns joined with a space, e.g.
/// `01/04/24 00:05`.
pub const UPS_FORMATS: &[&str] = &["%m/%d/%y %H:%M", "%m/%d/%Y %H:%M"];

/// Parse a local wall-clock stamp with the first matching format.
pub fn parse_local_timestamp(value: &str, formats: &[&str]) -> Result<i64, IngestError> {
    let stripped = strip_zone_suffix(value.trim());
    for &format in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, format) {
            // `earliest` resolves the ambiguous hour of a fall-back
            // transition; a nonexistent spring-forward stamp falls through
            // to the error.
            if let Some(dt) = naive.and_local_timezone(Local).earliest() {
                return Ok(dt.timestamp());
            }
        }
    }
    Err(IngestError::Timestamp {
        value: value.to_string(),
        tried: formats.join(", "),
    })
}

/// Epoch-seconds field used by the HPC logs.
pub fn parse_epoch(value: &str) -> Result<i64, IngestError> {
    value.trim().parse::<i64>().map_err(|_| IngestError::Timestamp {
        value: value.to_string(),
        tried: "epoch seconds".to_string(),
    })
}

/// Drop a trailing timezone abbreviation (`EST`, `EDT`, ...). The sources
/// stamp local time, so the abbreviation adds nothing, but `AM`/`PM` must
/// survive for the 12-hour formats.
fn strip_zone_suffix(value: &str) -> &str {
    if let Some((head, tail)) = value.rsplit_once(' ') {
        let looks_like_zone = (2..=4).contains(&tail.len())
            && tail.chars().all(|c| c.is_ascii_uppercase())
            && tail != "AM"
            && tail != "PM";
        if looks_like_zone {
            return head;
        }
    }
    value
}
