//! Ray picking against the position buffer
//!
//! The batch is too large for per-entity mesh picking, so the cursor ray is
//! tested against every position directly.

use bevy::prelude::*;

use crate::core::space::SceneFrame;
use crate::propagation::PositionBuffer;

pub type PickRay = Ray3d;

/// Cursor position in logical pixels to normalized device coordinates.
pub fn ndc_from_cursor(cursor: Vec2, window_size: Vec2) -> Vec2 {
    Vec2::new(
        cursor.x / window_size.x * 2.0 - 1.0,
        -(cursor.y / window_size.y * 2.0 - 1.0),
    )
}

/// World-space ray through `ndc`, from the near plane toward the far plane.
pub fn ray_from_ndc(camera: &Camera, camera_transform: &GlobalTransform, ndc: Vec2) -> Option<PickRay> {
    // Reverse-Z: near plane at 1, far plane toward 0.
    let near = camera.ndc_to_world(camera_transform, ndc.extend(1.0))?;
    let far = camera.ndc_to_world(camera_transform, ndc.extend(f32::EPSILON))?;
    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d::new(near, direction))
}

/// Index of the valid position closest to `ray` within `threshold`.
///
/// Points behind the ray origin are skipped. A point in the hemisphere facing
/// away from the camera (`dot(p, camera_pos) < 0`) is treated as hidden by
/// the globe. Ties keep the first index found.
pub fn pick_nearest(
    positions: &PositionBuffer,
    frame: &SceneFrame,
    ray: &PickRay,
    camera_pos: Vec3,
    threshold: f32,
) -> Option<usize> {
    let dir = ray.direction.as_vec3();
    let mut best: Option<(usize, f32)> = None;

    for (i, slot) in positions.iter().enumerate() {
        let Some(ecef) = slot else {
            continue;
        };
        let p = frame.ecef_to_scene(ecef);
        let to_point = p - ray.origin;
        let along = to_point.dot(dir);
        if along < 0.0 {
            continue;
        }
        let dist = (to_point - dir * along).length();
        if dist >= threshold {
            continue;
        }
        if p.dot(camera_pos) < 0.0 {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }

    best.map(|(i, _)| i)
}
