//! TLE decoding: epoch parsing and SGP4 handle construction

use bevy::log::warn;
use chrono::{DateTime, Utc};

use crate::tle::encoder::encode_record;
use crate::tle::types::{OrbitalElementRecord, PropagationHandle};

/// Parse TLE epoch from line 1 to UTC DateTime
pub fn parse_tle_epoch_to_utc(line1: &str) -> Option<DateTime<Utc>> {
    // TLE line1 epoch fields (columns 19–32, 1-based; 18..32 0-based)
    if line1.len() < 32 {
        return None;
    }
    let s = &line1[18..32];
    let mut parts = s.trim().split('.');
    let yyddd = parts.next()?;
    let frac = parts.next().unwrap_or("0");
    if yyddd.len() < 3 {
        return None;
    }
    let (yy_str, ddd_str) = yyddd.split_at(2);
    let yy: i32 = yy_str.parse().ok()?;
    let ddd: i32 = ddd_str.trim().parse().ok()?;
    let year = if yy >= 57 { 1900 + yy } else { 2000 + yy };
    let jan1 = chrono::NaiveDate::from_ymd_opt(year, 1, 1)?;
    let date = jan1.checked_add_signed(chrono::Duration::days((ddd - 1) as i64))?;
    let frac_sec: f64 = format!("0.{}", frac).parse::<f64>().ok()? * 86400.0;
    let secs = frac_sec.trunc() as i64;
    let nanos = ((frac_sec - (secs as f64)) * 1e9).round() as i64;
    let ndt = date.and_hms_opt(0, 0, 0)?
        + chrono::Duration::seconds(secs)
        + chrono::Duration::nanoseconds(nanos);
    Some(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
}

/// Encode `record` and build its SGP4 model.
///
/// Never fails outright: any encode or decode problem is logged and yields
/// [`PropagationHandle::Failed`], which propagates as "no position" forever.
pub fn decode_handle(record: &OrbitalElementRecord) -> PropagationHandle {
    let lines = match encode_record(record) {
        Ok(lines) => lines,
        Err(e) => {
            warn!("[SGP4] id={} encode error: {}", record.id, e);
            return PropagationHandle::Failed;
        }
    };

    let elements = match sgp4::Elements::from_tle(
        Some(record.name.clone()),
        lines.line1.as_bytes(),
        lines.line2.as_bytes(),
    ) {
        Ok(elements) => elements,
        Err(e) => {
            warn!("[SGP4] id={} elements error: {}", record.id, e);
            return PropagationHandle::Failed;
        }
    };

    match sgp4::Constants::from_elements(&elements) {
        Ok(constants) => PropagationHandle::Valid {
            constants: Box::new(constants),
            epoch_utc: parse_tle_epoch_to_utc(&lines.line1)
                .unwrap_or_else(|| elements.datetime.and_utc()),
        },
        Err(e) => {
            warn!("[SGP4] id={} constants error: {}", record.id, e);
            PropagationHandle::Failed
        }
    }
}
