//! Tracking pipeline state shared by the satellite systems
//!
//! Holds the latest position buffer, the instance batch built from it, the
//! current instance scale, and hover/selection. All queries take a catalog
//! index and answer `None` for anything out of range or without a position.

use bevy::prelude::*;

use crate::config::{PickingConfig, SceneScaleConfig};
use crate::core::coordinates::GeodeticStats;
use crate::core::space::SceneFrame;
use crate::propagation::PositionBuffer;
use crate::satellite::instances::{InstanceBatch, InstanceColor};
use crate::satellite::picking::{PickRay, pick_nearest};
use crate::satellite::scale::SceneScale;
use crate::satellite::selection::SelectionState;
use crate::tle::OrbitalElementRecord;

#[derive(Resource)]
pub struct TrackingPipeline {
    frame: SceneFrame,
    picking: PickingConfig,
    positions: PositionBuffer,
    scale: SceneScale,
    selection: SelectionState,
    instances: InstanceBatch,
}

impl TrackingPipeline {
    pub fn new(frame: SceneFrame, scale: SceneScaleConfig, picking: PickingConfig) -> Self {
        Self {
            frame,
            picking,
            positions: PositionBuffer::default(),
            scale: SceneScale::new(scale),
            selection: SelectionState::default(),
            instances: InstanceBatch::default(),
        }
    }

    /// Start over for a freshly loaded catalog.
    pub fn reset(&mut self, records: &[OrbitalElementRecord]) {
        self.instances = InstanceBatch::new(records.iter().map(InstanceColor::classify).collect());
        self.positions = PositionBuffer::default();
        self.selection = SelectionState::default();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn frame(&self) -> &SceneFrame {
        &self.frame
    }

    pub fn positions(&self) -> &PositionBuffer {
        &self.positions
    }

    pub fn scale(&self) -> f32 {
        self.scale.current()
    }

    pub fn instances_mut(&mut self) -> &mut InstanceBatch {
        &mut self.instances
    }

    /// Replace the positions wholesale and resync every instance.
    pub fn apply_positions(&mut self, positions: PositionBuffer) {
        self.positions = positions;
        self.resync_all();
    }

    /// Track the camera distance; resyncs only when the scale actually moved.
    pub fn update_scale(&mut self, camera_distance: f32) -> bool {
        if !self.scale.update(camera_distance) {
            return false;
        }
        if !self.positions.is_empty() {
            self.resync_all();
        }
        true
    }

    pub fn hovered(&self) -> Option<usize> {
        self.selection.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected
    }

    /// Returns true if the hovered index changed.
    pub fn set_hovered(&mut self, index: Option<usize>) -> bool {
        let index = self.in_range(index);
        let old = self.selection.hovered;
        if old == index {
            return false;
        }
        self.selection.hovered = index;
        self.recolor(old, index);
        true
    }

    /// Returns true if the selected index changed.
    pub fn set_selected(&mut self, index: Option<usize>) -> bool {
        let index = self.in_range(index);
        let old = self.selection.selected;
        if old == index {
            return false;
        }
        self.selection.selected = index;
        self.recolor(old, index);
        true
    }

    /// Scene-space position of `index`, if it has one.
    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions
            .get(index)
            .map(|ecef| self.frame.ecef_to_scene(ecef))
    }

    /// Geodetic readout of the object as placed in the scene.
    pub fn live_stats(&self, index: usize) -> Option<GeodeticStats> {
        let scene = self.position(index)?;
        Some(GeodeticStats::from_ecef_km(self.frame.scene_to_ecef(scene)))
    }

    pub fn pick_threshold(&self, camera_distance: f32) -> f32 {
        camera_distance / self.picking.reference_distance * self.picking.radius_at_reference
    }

    /// Nearest visible object to `ray`, if any is within the pick radius.
    pub fn pick(&self, ray: &PickRay, camera_pos: Vec3) -> Option<usize> {
        pick_nearest(
            &self.positions,
            &self.frame,
            ray,
            camera_pos,
            self.pick_threshold(camera_pos.length()),
        )
    }

    fn in_range(&self, index: Option<usize>) -> Option<usize> {
        index.filter(|i| *i < self.instances.len())
    }

    fn recolor(&mut self, old: Option<usize>, new: Option<usize>) {
        for i in [old, new].into_iter().flatten() {
            self.instances.sync_color(i, &self.selection);
        }
    }

    fn resync_all(&mut self) {
        self.instances.sync_all(
            &self.positions,
            &self.frame,
            self.scale.current(),
            &self.selection,
        );
    }
}
