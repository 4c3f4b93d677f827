//! Earth-frame math shared by the propagation worker and the viewer
//!
//! - Julian date and Greenwich Mean Sidereal Time for a UTC instant
//! - ECI (TEME) -> ECEF rotation
//! - Spherical geodetic readout used for live telemetry

use bevy::math::{DVec3, Vec3};
use chrono::{DateTime, Datelike, Timelike, Utc};

pub const EARTH_RADIUS_KM: f32 = 6371.0;
pub const EARTH_RADIUS_KM_F64: f64 = EARTH_RADIUS_KM as f64;

/// Compute the Julian Date (UTC) for a given timestamp.
/// Uses the standard Gregorian calendar to JD conversion.
pub fn julian_date_utc(t: DateTime<Utc>) -> f64 {
    let mut y = t.year();
    let mut m = t.month() as i32;
    let d = t.day() as i32;

    let hour = t.hour() as f64;
    let minute = t.minute() as f64;
    let sec = t.second() as f64 + (t.nanosecond() as f64) * 1e-9_f64;
    let day_fraction = (hour + (minute + sec / 60.0) / 60.0) / 24.0;

    if m <= 2 {
        y -= 1;
        m += 12;
    }

    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    let jd0 = (365.25 * (y as f64 + 4716.0)).floor()
        + (30.6001 * ((m + 1) as f64)).floor()
        + d as f64
        + b
        - 1524.5;

    jd0 + day_fraction
}

/// Greenwich Mean Sidereal Time (radians) using the IAU 1982 polynomial.
/// Assumes UT1 ~= UTC, which is plenty for a viewer.
pub fn gmst_rad(t: DateTime<Utc>) -> f64 {
    let jd = julian_date_utc(t);
    let t_cent = (jd - 2451545.0) / 36525.0;

    let gmst_sec =
        67310.54841 + (876600.0 * 3600.0 + 8640184.812866) * t_cent + 0.093104 * t_cent * t_cent
            - 6.2e-6 * t_cent * t_cent * t_cent;

    let sec_in_day = 86400.0_f64;
    s_to_rad(gmst_sec.rem_euclid(sec_in_day), sec_in_day)
}

fn s_to_rad(seconds: f64, sec_in_day: f64) -> f64 {
    seconds * (std::f64::consts::TAU / sec_in_day)
}

/// Rotate ECI (TEME) -> ECEF by -GMST about Z.
pub fn eci_to_ecef_km(eci: DVec3, gmst: f64) -> DVec3 {
    let (s, c) = gmst.sin_cos();
    let x = c * eci.x + s * eci.y;
    let y = -s * eci.x + c * eci.y;
    DVec3::new(x, y, eci.z)
}

/// Live telemetry for one tracked object, derived from its Earth-fixed position.
///
/// Latitude/longitude are spherical (not ellipsoidal) and altitude is measured
/// from a spherical Earth of radius [`EARTH_RADIUS_KM`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodeticStats {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub ecef_km: DVec3,
}

impl GeodeticStats {
    pub fn from_ecef_km(ecef: Vec3) -> Self {
        let p = ecef.as_dvec3();
        let longitude = p.y.atan2(p.x);
        let hypot = (p.x * p.x + p.y * p.y).sqrt();
        let latitude = p.z.atan2(hypot);
        Self {
            latitude_deg: latitude.to_degrees(),
            longitude_deg: longitude.to_degrees(),
            altitude_km: p.length() - EARTH_RADIUS_KM_F64,
            ecef_km: p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gmst_rad_j2000_known_value() {
        // GMST at J2000.0 (2000-01-01 12:00:00 UT1) is 280.46061837 deg
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let deg = gmst_rad(t).to_degrees();
        let diff = (deg - 280.46061837_f64).abs();
        assert!(diff < 0.05, "gmst deg diff too large: {} deg", diff);
    }

    #[test]
    fn test_gmst_rad_is_normalized() {
        let t = Utc.with_ymd_and_hms(1985, 7, 3, 23, 59, 59).unwrap();
        let g = gmst_rad(t);
        assert!((0.0..std::f64::consts::TAU).contains(&g));
    }

    #[test]
    fn test_gmst_advances_one_sidereal_turn_per_sidereal_day() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::milliseconds(86_164_091);
        let diff = (gmst_rad(t1) - gmst_rad(t0)).rem_euclid(std::f64::consts::TAU);
        let wrapped = diff.min(std::f64::consts::TAU - diff);
        assert!(wrapped < 1e-4, "gmst drift after one sidereal day: {}", wrapped);
    }

    #[test]
    fn test_julian_date_j2000_noon() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let jd = julian_date_utc(t);
        assert!((jd - 2451545.0).abs() < 1e-9, "jd = {}", jd);
    }

    #[test]
    fn test_julian_date_leap_year_boundaries() {
        let feb_28 = julian_date_utc(Utc.with_ymd_and_hms(2000, 2, 28, 12, 0, 0).unwrap());
        let mar_01 = julian_date_utc(Utc.with_ymd_and_hms(2000, 3, 1, 12, 0, 0).unwrap());
        assert!((mar_01 - feb_28 - 2.0).abs() < 1e-9);

        let feb_28_1900 = julian_date_utc(Utc.with_ymd_and_hms(1900, 2, 28, 12, 0, 0).unwrap());
        let mar_01_1900 = julian_date_utc(Utc.with_ymd_and_hms(1900, 3, 1, 12, 0, 0).unwrap());
        assert!((mar_01_1900 - feb_28_1900 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_eci_to_ecef_km() {
        let eci = DVec3::new(1000.0, 0.0, 0.0);
        let ecef = eci_to_ecef_km(eci, 0.0);
        assert!((ecef.x - 1000.0).abs() < 1e-10);
        assert!(ecef.y.abs() < 1e-10);
        assert!(ecef.z.abs() < 1e-10);

        let ecef_90 = eci_to_ecef_km(eci, std::f64::consts::FRAC_PI_2);
        assert!(ecef_90.x.abs() < 1e-10);
        assert!((ecef_90.y + 1000.0).abs() < 1e-10);
        assert!(ecef_90.z.abs() < 1e-10);
    }

    #[test]
    fn test_eci_to_ecef_preserves_length_and_polar_axis() {
        let eci = DVec3::new(4000.0, -3000.0, 5200.0);
        let ecef = eci_to_ecef_km(eci, 1.234);
        assert!((ecef.length() - eci.length()).abs() < 1e-9);
        assert_eq!(ecef.z, eci.z);
    }

    #[test]
    fn test_geodetic_stats_equator_prime_meridian() {
        let stats = GeodeticStats::from_ecef_km(Vec3::new(EARTH_RADIUS_KM + 400.0, 0.0, 0.0));
        assert!(stats.latitude_deg.abs() < 1e-9);
        assert!(stats.longitude_deg.abs() < 1e-9);
        assert!((stats.altitude_km - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_geodetic_stats_ninety_east_and_north_pole() {
        let east = GeodeticStats::from_ecef_km(Vec3::new(0.0, 7000.0, 0.0));
        assert!((east.longitude_deg - 90.0).abs() < 1e-9);
        assert!(east.latitude_deg.abs() < 1e-9);

        let pole = GeodeticStats::from_ecef_km(Vec3::new(0.0, 0.0, 7000.0));
        assert!((pole.latitude_deg - 90.0).abs() < 1e-9);
        assert!((pole.altitude_km - (7000.0 - EARTH_RADIUS_KM_F64)).abs() < 1e-6);
    }

    #[test]
    fn test_geodetic_stats_southern_western_quadrant() {
        let stats = GeodeticStats::from_ecef_km(Vec3::new(-5000.0, -5000.0, -3000.0));
        assert!(stats.latitude_deg < 0.0);
        assert!((stats.longitude_deg + 135.0).abs() < 1e-6);
    }
}
