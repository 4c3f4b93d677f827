//! Per-instance transform and color for the satellite batch
//!
//! The batch is plain data. A Bevy system mirrors it onto entities, using the
//! dirty flags here to skip work when nothing changed.

use bevy::prelude::*;

use crate::core::space::SceneFrame;
use crate::propagation::PositionBuffer;
use crate::satellite::selection::SelectionState;
use crate::tle::OrbitalElementRecord;

/// Mean motion (rev/day) at or above which an orbit counts as low.
pub const LOW_ORBIT_MEAN_MOTION: f64 = 11.25;
/// Mean motion above which an orbit counts as medium; one sidereal rev/day.
pub const MEDIUM_ORBIT_MEAN_MOTION: f64 = 1.0027;
const STARLINK_TAG: &str = "STARLINK";

/// Display class of one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceColor {
    Accent,
    Starlink,
    Low,
    Medium,
    High,
}

impl InstanceColor {
    pub const ALL: [InstanceColor; 5] = [
        InstanceColor::Accent,
        InstanceColor::Starlink,
        InstanceColor::Low,
        InstanceColor::Medium,
        InstanceColor::High,
    ];

    pub fn to_color(self) -> Color {
        match self {
            InstanceColor::Accent => Color::srgb_u8(0x00, 0xff, 0x00),
            InstanceColor::Starlink => Color::srgb_u8(0xbb, 0xbb, 0xff),
            InstanceColor::Low => Color::srgb_u8(0xff, 0xff, 0xff),
            InstanceColor::Medium => Color::srgb_u8(0xff, 0xff, 0x00),
            InstanceColor::High => Color::srgb_u8(0xff, 0x00, 0x00),
        }
    }

    /// Base color of a record, before hover/selection.
    pub fn classify(record: &OrbitalElementRecord) -> Self {
        if record.name.contains(STARLINK_TAG) {
            InstanceColor::Starlink
        } else {
            Self::band(record.mean_motion_rev_per_day)
        }
    }

    pub fn band(mean_motion: f64) -> Self {
        if mean_motion >= LOW_ORBIT_MEAN_MOTION {
            InstanceColor::Low
        } else if mean_motion > MEDIUM_ORBIT_MEAN_MOTION {
            InstanceColor::Medium
        } else {
            InstanceColor::High
        }
    }
}

/// Which color slots need to reach the renderer.
#[derive(Debug, Default, PartialEq)]
pub enum ColorWrites {
    #[default]
    None,
    All,
    Some(Vec<usize>),
}

#[derive(Default)]
pub struct InstanceBatch {
    transforms: Vec<Transform>,
    colors: Vec<InstanceColor>,
    base: Vec<InstanceColor>,
    transforms_dirty: bool,
    colors_dirty_all: bool,
    pending_colors: Vec<usize>,
}

impl InstanceBatch {
    pub fn new(base: Vec<InstanceColor>) -> Self {
        let n = base.len();
        Self {
            transforms: vec![hidden(); n],
            colors: base.clone(),
            base,
            transforms_dirty: true,
            colors_dirty_all: true,
            pending_colors: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transform(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    pub fn color(&self, index: usize) -> Option<InstanceColor> {
        self.colors.get(index).copied()
    }

    /// Rewrite every transform and color.
    pub fn sync_all(
        &mut self,
        positions: &PositionBuffer,
        frame: &SceneFrame,
        scale: f32,
        selection: &SelectionState,
    ) {
        for (i, t) in self.transforms.iter_mut().enumerate() {
            *t = match positions.get(i) {
                Some(ecef) => {
                    Transform::from_translation(frame.ecef_to_scene(ecef))
                        .looking_at(Vec3::ZERO, Vec3::Y)
                        .with_scale(Vec3::splat(scale))
                }
                None => hidden(),
            };
        }
        for i in 0..self.colors.len() {
            self.colors[i] = self.resolve_color(i, selection);
        }
        self.transforms_dirty = true;
        self.colors_dirty_all = true;
        self.pending_colors.clear();
    }

    /// Recompute one color; out-of-range indices are ignored.
    pub fn sync_color(&mut self, index: usize, selection: &SelectionState) {
        if index >= self.colors.len() {
            return;
        }
        self.colors[index] = self.resolve_color(index, selection);
        if !self.colors_dirty_all && !self.pending_colors.contains(&index) {
            self.pending_colors.push(index);
        }
    }

    pub fn take_transforms_dirty(&mut self) -> bool {
        std::mem::take(&mut self.transforms_dirty)
    }

    pub fn take_color_writes(&mut self) -> ColorWrites {
        if std::mem::take(&mut self.colors_dirty_all) {
            self.pending_colors.clear();
            ColorWrites::All
        } else if self.pending_colors.is_empty() {
            ColorWrites::None
        } else {
            ColorWrites::Some(std::mem::take(&mut self.pending_colors))
        }
    }

    fn resolve_color(&self, index: usize, selection: &SelectionState) -> InstanceColor {
        if selection.is_highlighted(index) {
            InstanceColor::Accent
        } else {
            self.base[index]
        }
    }
}

/// Zero-scale transform at the origin; keeps the slot without drawing it.
fn hidden() -> Transform {
    Transform::from_translation(Vec3::ZERO).with_scale(Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::types::fixtures;

    #[test]
    fn test_mean_motion_bands() {
        assert_eq!(InstanceColor::band(16.0), InstanceColor::Low);
        assert_eq!(InstanceColor::band(2.0), InstanceColor::Medium);
        assert_eq!(InstanceColor::band(0.5), InstanceColor::High);
        assert_eq!(InstanceColor::band(11.25), InstanceColor::Low);
        assert_eq!(InstanceColor::band(1.0027), InstanceColor::High);
    }

    #[test]
    fn test_starlink_name_overrides_band() {
        let rec = fixtures::with_mean_motion(44713, "STARLINK-1007", 0.5);
        assert_eq!(InstanceColor::classify(&rec), InstanceColor::Starlink);
        let rec = fixtures::with_mean_motion(1, "starlink lower", 0.5);
        assert_eq!(InstanceColor::classify(&rec), InstanceColor::High);
    }

    #[test]
    fn test_sync_all_hides_missing_positions() {
        let mut batch = InstanceBatch::new(vec![InstanceColor::Low; 5]);
        let frame = SceneFrame::new(100.0);
        let mut slots = vec![Some(Vec3::new(7000.0, 0.0, 0.0)); 5];
        slots[4] = None;
        let positions = PositionBuffer::from_slots(slots);

        batch.sync_all(&positions, &frame, 0.6, &SelectionState::default());

        let hidden = batch.transform(4).unwrap();
        assert_eq!(hidden.scale, Vec3::ZERO);
        assert_eq!(hidden.translation, Vec3::ZERO);

        let shown = batch.transform(0).unwrap();
        assert!((shown.scale - Vec3::splat(0.6)).length() < 1e-6);
        let expected = frame.ecef_to_scene(Vec3::new(7000.0, 0.0, 0.0));
        assert!((shown.translation - expected).length() < 1e-4);
        // -Z forward points at the origin
        let forward = shown.forward();
        assert!((forward.as_vec3() + expected.normalize()).length() < 1e-4);
    }

    #[test]
    fn test_sync_all_marks_everything_dirty() {
        let mut batch = InstanceBatch::new(vec![InstanceColor::Low; 2]);
        let _ = batch.take_transforms_dirty();
        let _ = batch.take_color_writes();

        batch.sync_all(
            &PositionBuffer::from_slots(vec![None, None]),
            &SceneFrame::default(),
            1.0,
            &SelectionState::default(),
        );
        assert!(batch.take_transforms_dirty());
        assert!(!batch.take_transforms_dirty());
        assert_eq!(batch.take_color_writes(), ColorWrites::All);
        assert_eq!(batch.take_color_writes(), ColorWrites::None);
    }

    #[test]
    fn test_sync_color_records_single_writes() {
        let mut batch = InstanceBatch::new(vec![InstanceColor::Medium; 3]);
        let _ = batch.take_color_writes();

        let selection = SelectionState {
            hovered: Some(1),
            selected: None,
        };
        batch.sync_color(1, &selection);
        batch.sync_color(1, &selection);
        batch.sync_color(7, &selection);

        assert_eq!(batch.color(1), Some(InstanceColor::Accent));
        assert_eq!(batch.color(0), Some(InstanceColor::Medium));
        assert_eq!(batch.take_color_writes(), ColorWrites::Some(vec![1]));
    }
}
