//! Mapping between the Earth-fixed propagation frame and scene space.
//!
//! ECEF (km): +X prime meridian, +Y 90°E, +Z north.
//! Scene:     +Z prime meridian, +X 90°E, +Y north (up).
//!
//! Mapping: scene (x,y,z) = (ECEF.y, ECEF.z, ECEF.x) * scale
//! Inverse: ECEF (x,y,z) = (scene.z, scene.x, scene.y) / scale

use bevy::math::Vec3;

use crate::core::coordinates::EARTH_RADIUS_KM;

/// Uniform scale plus axis permutation from ECEF kilometers into scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneFrame {
    scene_radius: f32,
    scale: f32,
}

impl SceneFrame {
    /// A frame where the globe is drawn with radius `scene_radius`.
    pub fn new(scene_radius: f32) -> Self {
        Self {
            scene_radius,
            scale: scene_radius / EARTH_RADIUS_KM,
        }
    }

    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Scene units per kilometer.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn ecef_to_scene(&self, ecef_km: Vec3) -> Vec3 {
        Vec3::new(ecef_km.y, ecef_km.z, ecef_km.x) * self.scale
    }

    pub fn scene_to_ecef(&self, scene: Vec3) -> Vec3 {
        Vec3::new(scene.z, scene.x, scene.y) / self.scale
    }
}

impl Default for SceneFrame {
    fn default() -> Self {
        Self::new(100.0)
    }
}
