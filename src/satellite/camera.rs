//! Camera modes relative to the selected object

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use std::f32::consts::{PI, TAU};

use crate::config::ViewerConfig;
use crate::satellite::TrackingPipeline;

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    #[default]
    Free,
    /// Focus rides along with the object, orbit offset unchanged.
    Follow,
    /// Ease in above the object, looking straight down at it.
    Nadir,
}

/// Orbit yaw/pitch that puts the camera along `dir` from its focus.
pub fn yaw_pitch_toward(dir: Vec3) -> (f32, f32) {
    let d = dir.normalize_or_zero();
    (d.x.atan2(d.z), d.y.clamp(-1.0, 1.0).asin())
}

/// Step `current` toward `target` by `t`, going the short way round.
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    let mut diff = (target - current).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    current + diff * t
}

/// Point the orbit camera at `focus` from `radius` along `dir`, immediately.
pub fn snap_camera(poc: &mut PanOrbitCamera, focus: Vec3, dir: Vec3, radius: f32) {
    let (yaw, pitch) = yaw_pitch_toward(dir);
    poc.focus = focus;
    poc.target_focus = focus;
    poc.radius = Some(radius);
    poc.target_radius = radius;
    poc.yaw = Some(yaw);
    poc.target_yaw = yaw;
    poc.pitch = Some(pitch);
    poc.target_pitch = pitch;
    poc.force_update = true;
}

pub fn camera_mode_controls(
    input: Res<ButtonInput<KeyCode>>,
    mut mode: ResMut<CameraMode>,
    mut q_camera: Query<&mut PanOrbitCamera>,
) {
    let next = if input.just_pressed(KeyCode::Digit1) {
        CameraMode::Free
    } else if input.just_pressed(KeyCode::Digit2) {
        CameraMode::Follow
    } else if input.just_pressed(KeyCode::Digit3) {
        CameraMode::Nadir
    } else {
        return;
    };
    *mode = next;
    info!("Camera mode {:?}", next);

    if next == CameraMode::Free
        && let Ok(mut poc) = q_camera.single_mut()
    {
        poc.target_focus = Vec3::ZERO;
    }
}

pub fn apply_camera_mode(
    mode: Res<CameraMode>,
    config: Res<ViewerConfig>,
    pipeline: Res<TrackingPipeline>,
    mut q_camera: Query<&mut PanOrbitCamera>,
) {
    if *mode == CameraMode::Free {
        return;
    }
    let Some(p) = pipeline.selected().and_then(|i| pipeline.position(i)) else {
        return;
    };
    let Ok(mut poc) = q_camera.single_mut() else {
        return;
    };

    match *mode {
        CameraMode::Free => {}
        CameraMode::Follow => {
            poc.focus = p;
            poc.target_focus = p;
            poc.force_update = true;
        }
        CameraMode::Nadir => {
            let t = config.camera.nadir_lerp;
            let radius = config.camera.nadir_offset;
            let (yaw, pitch) = yaw_pitch_toward(p);

            let focus = poc.focus.lerp(p, t);
            poc.focus = focus;
            poc.target_focus = focus;

            let r = poc.radius.map_or(radius, |r| r + (radius - r) * t);
            poc.radius = Some(r);
            poc.target_radius = r;

            let y = poc.yaw.map_or(yaw, |y| lerp_angle(y, yaw, t));
            poc.yaw = Some(y);
            poc.target_yaw = y;

            let pt = poc.pitch.map_or(pitch, |c| c + (pitch - c) * t);
            poc.pitch = Some(pt);
            poc.target_pitch = pt;

            poc.force_update = true;
        }
    }
}
