//! Orbital element records and their two-line encoding

use serde::{Deserialize, Serialize};

/// Compact mean orbital elements for one tracked object.
///
/// On disk a record is a fixed-shape tuple:
/// `[id, name, epoch_unix, incl, raan, ecc, argp, ma, mm, bstar]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordTuple", into = "RecordTuple")]
pub struct OrbitalElementRecord {
    pub id: u32,
    pub name: String,
    pub epoch_unix_seconds: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub eccentricity: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
    pub bstar: f64,
}

#[derive(Serialize, Deserialize)]
struct RecordTuple(
    u32,
    Option<String>,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
);

impl From<RecordTuple> for OrbitalElementRecord {
    fn from(t: RecordTuple) -> Self {
        Self {
            id: t.0,
            name: t.1.unwrap_or_default(),
            epoch_unix_seconds: t.2,
            inclination_deg: t.3,
            raan_deg: t.4,
            eccentricity: t.5,
            arg_perigee_deg: t.6,
            mean_anomaly_deg: t.7,
            mean_motion_rev_per_day: t.8,
            bstar: t.9,
        }
    }
}

impl From<OrbitalElementRecord> for RecordTuple {
    fn from(r: OrbitalElementRecord) -> Self {
        RecordTuple(
            r.id,
            Some(r.name),
            r.epoch_unix_seconds,
            r.inclination_deg,
            r.raan_deg,
            r.eccentricity,
            r.arg_perigee_deg,
            r.mean_anomaly_deg,
            r.mean_motion_rev_per_day,
            r.bstar,
        )
    }
}

/// A pair of 69-column TLE lines, each ending in its checksum digit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TleLines {
    pub line1: String,
    pub line2: String,
}

/// Decoded SGP4 state for one record, or the permanent failure marker.
pub enum PropagationHandle {
    Valid {
        constants: Box<sgp4::Constants>,
        epoch_utc: chrono::DateTime<chrono::Utc>,
    },
    Failed,
}

impl PropagationHandle {
    pub fn is_valid(&self) -> bool {
        matches!(self, PropagationHandle::Valid { .. })
    }
}
