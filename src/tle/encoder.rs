//! Two-line element synthesis from compact element records
//!
//! SGP4 only accepts elements through the fixed-column TLE format, so every
//! record is rendered into two 69-column lines before decoding. Column
//! alignment is load-bearing: a field that spills into its neighbour makes the
//! decoder read garbage, so any overflow is reported as an error instead.

use chrono::{DateTime, Datelike, Timelike, Utc};
use thiserror::Error;

use crate::tle::types::{OrbitalElementRecord, TleLines};

pub const TLE_LINE_LEN: usize = 69;

/// Drag term written to line 1. The record's BSTAR is deliberately ignored:
/// a zero drag term keeps long propagations from diverging on stale elements.
const BSTAR_PLACEHOLDER: &str = "00000-0";

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("catalog id {0} does not fit the 5-digit TLE field")]
    IdOutOfRange(u32),
    #[error("eccentricity {0} is outside [0, 1)")]
    Eccentricity(f64),
    #[error("non-finite value in field {0}")]
    NonFinite(&'static str),
    #[error("epoch {0} is not a representable UTC instant")]
    Epoch(f64),
    #[error("line {line} is {len} columns, expected {TLE_LINE_LEN}")]
    LineLength { line: u8, len: usize },
}

/// Render `record` as a checksummed TLE pair.
pub fn encode_record(record: &OrbitalElementRecord) -> Result<TleLines, EncodeError> {
    if record.id > 99_999 {
        return Err(EncodeError::IdOutOfRange(record.id));
    }
    for (field, value) in [
        ("epoch", record.epoch_unix_seconds),
        ("inclination", record.inclination_deg),
        ("raan", record.raan_deg),
        ("eccentricity", record.eccentricity),
        ("arg_perigee", record.arg_perigee_deg),
        ("mean_anomaly", record.mean_anomaly_deg),
        ("mean_motion", record.mean_motion_rev_per_day),
    ] {
        if !value.is_finite() {
            return Err(EncodeError::NonFinite(field));
        }
    }

    let epoch = epoch_from_unix(record.epoch_unix_seconds)?;
    let year = epoch.year().rem_euclid(100);

    let line1_body = format!(
        "1 {:05}U 00000A   {:02}{:012.8}  .00000000  00000-0  {} 0  999",
        record.id,
        year,
        day_of_year(epoch),
        BSTAR_PLACEHOLDER,
    );

    let line2_body = format!(
        "2 {:05} {:>8.4} {:>8.4} {} {:>8.4} {:>8.4} {:>11.8}00001",
        record.id,
        record.inclination_deg,
        record.raan_deg,
        eccentricity_field(record.eccentricity)?,
        record.arg_perigee_deg,
        record.mean_anomaly_deg,
        record.mean_motion_rev_per_day,
    );

    Ok(TleLines {
        line1: with_checksum(line1_body, 1)?,
        line2: with_checksum(line2_body, 2)?,
    })
}

/// Mod-10 TLE checksum: digits count their value, '-' counts one.
pub fn checksum(body: &str) -> u8 {
    let sum: u32 = body
        .chars()
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

fn with_checksum(body: String, line: u8) -> Result<String, EncodeError> {
    if body.len() != TLE_LINE_LEN - 1 {
        return Err(EncodeError::LineLength {
            line,
            len: body.len() + 1,
        });
    }
    let digit = checksum(&body);
    let mut out = body;
    out.push(char::from(b'0' + digit));
    Ok(out)
}

fn epoch_from_unix(seconds: f64) -> Result<DateTime<Utc>, EncodeError> {
    let millis = (seconds * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return Err(EncodeError::Epoch(seconds));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64).ok_or(EncodeError::Epoch(seconds))
}

/// Fractional day of year where Jan 1 00:00 UTC is 1.0. Zero-padded to
/// three integer digits on line 1, as in published element sets.
fn day_of_year(t: DateTime<Utc>) -> f64 {
    let secs_of_day =
        t.num_seconds_from_midnight() as f64 + t.nanosecond() as f64 / 1_000_000_000.0;
    t.ordinal() as f64 + secs_of_day / 86_400.0
}

/// Seven decimal digits with the leading "0." removed, e.g. 0.0007888 -> "0007888".
fn eccentricity_field(ecc: f64) -> Result<String, EncodeError> {
    let formatted = format!("{:.7}", ecc);
    match formatted.strip_prefix("0.") {
        Some(digits) if ecc >= 0.0 => Ok(digits.chars().take(7).collect()),
        _ => Err(EncodeError::Eccentricity(ecc)),
    }
}
