//! One-period orbit overlay for the selected object

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};

use crate::core::coordinates::gmst_rad;
use crate::core::space::SceneFrame;
use crate::orbital::propagate_ecef_km;
use crate::tle::{OrbitalElementRecord, decode_handle};

const MINUTES_PER_DAY: f64 = 1440.0;

/// What a selection request resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectAction {
    /// Same object clicked again while its overlay was showing.
    HideOverlay,
    Select,
}

#[derive(Resource, Default)]
pub struct OrbitOverlay {
    visible: bool,
    owner: Option<usize>,
    points: Vec<Vec3>,
    revision: u64,
}

impl OrbitOverlay {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn owner(&self) -> Option<usize> {
        self.owner
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Bumped every time a new path replaces the old one.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Resolve a selection of `index`, computing a new path when needed.
    ///
    /// A path with fewer than two points leaves the current overlay as it was.
    pub fn handle_select(
        &mut self,
        currently_selected: Option<usize>,
        index: usize,
        compute_path: impl FnOnce() -> Vec<Vec3>,
    ) -> SelectAction {
        if currently_selected == Some(index) && self.visible {
            self.visible = false;
            return SelectAction::HideOverlay;
        }

        let points = compute_path();
        if points.len() >= 2 {
            self.points = points;
            self.owner = Some(index);
            self.visible = true;
            self.revision += 1;
        } else {
            warn!("[ORBIT] no path for index {}", index);
        }
        SelectAction::Select
    }

    pub fn clear(&mut self) {
        self.visible = false;
        self.owner = None;
        self.points.clear();
    }
}

/// Sample one orbital period of `record` from `start`, in scene space.
///
/// Returns `samples + 1` points (both ends of the period), skipping any
/// sample that fails to propagate. Empty if the record cannot be decoded.
pub fn compute_orbit_path(
    record: &OrbitalElementRecord,
    start: DateTime<Utc>,
    samples: usize,
    frame: &SceneFrame,
) -> Vec<Vec3> {
    let handle = decode_handle(record);
    if !handle.is_valid() || samples == 0 || record.mean_motion_rev_per_day <= 0.0 {
        return Vec::new();
    }

    let period_ms = MINUTES_PER_DAY / record.mean_motion_rev_per_day * 60_000.0;
    let step_ms = period_ms / samples as f64;

    (0..=samples)
        .filter_map(|k| {
            let t = start + Duration::milliseconds((step_ms * k as f64) as i64);
            propagate_ecef_km(&handle, t, gmst_rad(t)).map(|p| frame.ecef_to_scene(p))
        })
        .collect()
}

/// Draw the overlay path plus a line from the selected object to the ground.
pub fn draw_selection_gizmos(
    overlay: Res<OrbitOverlay>,
    pipeline: Res<crate::satellite::TrackingPipeline>,
    mut gizmos: Gizmos,
) {
    let accent = Color::srgba_u8(0x00, 0xff, 0x00, 204);
    if overlay.is_visible() {
        gizmos.linestrip(overlay.points().iter().copied(), accent);
    }
    if let Some(p) = pipeline.selected().and_then(|i| pipeline.position(i)) {
        let ground = p.normalize_or_zero() * pipeline.frame().scene_radius();
        gizmos.line(p, ground, Color::srgba_u8(0x00, 0xff, 0x00, 153));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::types::fixtures;
    use chrono::TimeZone;

    fn line(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::splat(i as f32)).collect()
    }

    #[test]
    fn test_reselect_toggles_overlay_off() {
        let mut overlay = OrbitOverlay::default();
        assert_eq!(overlay.handle_select(None, 1, || line(3)), SelectAction::Select);
        assert!(overlay.is_visible());

        let action = overlay.handle_select(Some(1), 1, || panic!("no path needed"));
        assert_eq!(action, SelectAction::HideOverlay);
        assert!(!overlay.is_visible());

        // Third click on the same object brings it back.
        assert_eq!(overlay.handle_select(Some(1), 1, || line(3)), SelectAction::Select);
        assert!(overlay.is_visible());
    }

    #[test]
    fn test_switching_draws_exactly_one_path() {
        let mut overlay = OrbitOverlay::default();
        overlay.handle_select(None, 1, || line(3));
        let before = overlay.revision();

        let mut computed = 0;
        overlay.handle_select(Some(1), 2, || {
            computed += 1;
            line(4)
        });
        assert_eq!(computed, 1);
        assert_eq!(overlay.revision(), before + 1);
        assert_eq!(overlay.owner(), Some(2));
        assert_eq!(overlay.points().len(), 4);
    }

    #[test]
    fn test_failed_path_keeps_prior_overlay() {
        let mut overlay = OrbitOverlay::default();
        overlay.handle_select(None, 1, || line(3));
        let action = overlay.handle_select(Some(1), 2, || line(1));
        assert_eq!(action, SelectAction::Select);
        assert_eq!(overlay.owner(), Some(1));
        assert_eq!(overlay.points().len(), 3);
        assert!(overlay.is_visible());
    }

    #[test]
    fn test_compute_orbit_path_samples_one_period() {
        let frame = SceneFrame::new(100.0);
        let start = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        let path = compute_orbit_path(&fixtures::iss(), start, 100, &frame);
        assert_eq!(path.len(), 101);
        // LEO stays just above the globe
        for p in &path {
            let r = p.length();
            assert!(r > 100.0 && r < 110.0, "radius {}", r);
        }
        // After one period the Earth has turned ~23 deg underneath the orbit
        let drift = path[0].distance(path[100]);
        assert!(drift > 20.0 && drift < 60.0, "drift {}", drift);
    }

    #[test]
    fn test_compute_orbit_path_failed_record() {
        let mut rec = fixtures::iss();
        rec.eccentricity = 2.0;
        let start = Utc.with_ymd_and_hms(2024, 8, 13, 14, 0, 0).unwrap();
        assert!(compute_orbit_path(&rec, start, 100, &SceneFrame::default()).is_empty());
    }
}
