//! Orbital propagation utilities

use bevy::math::{DVec3, Vec3};
use chrono::{DateTime, Utc};

use crate::core::coordinates::eci_to_ecef_km;
use crate::tle::PropagationHandle;

/// Calculate minutes since epoch for SGP4 propagation
pub fn minutes_since_epoch(sim_utc: DateTime<Utc>, epoch: DateTime<Utc>) -> f64 {
    let delta = sim_utc - epoch;
    delta.num_seconds() as f64 / 60.0 + (delta.subsec_nanos() as f64) / 60.0 / 1.0e9
}

/// Earth-fixed position (km) of `handle` at `t`, given the sidereal angle for `t`.
///
/// `None` for a failed handle, an SGP4 error, or a non-finite result.
pub fn propagate_ecef_km(handle: &PropagationHandle, t: DateTime<Utc>, gmst: f64) -> Option<Vec3> {
    let PropagationHandle::Valid {
        constants,
        epoch_utc,
    } = handle
    else {
        return None;
    };
    let mins = minutes_since_epoch(t, *epoch_utc);
    let state = constants.propagate(sgp4::MinutesSinceEpoch(mins)).ok()?;
    let [x, y, z] = state.position;
    let ecef = eci_to_ecef_km(DVec3::new(x, y, z), gmst);
    ecef.is_finite().then(|| ecef.as_vec3())
}
