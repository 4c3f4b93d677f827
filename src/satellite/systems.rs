//! Satellite systems: instance spawning, propagation results, picking input

use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};
use bevy_panorbit_camera::PanOrbitCamera;

use crate::catalog::{Catalog, DEFAULT_SEARCH_LIMIT};
use crate::config::ViewerConfig;
use crate::orbital::SimulationTime;
use crate::propagation::{PropagationScheduler, SchedulerEvent};
use crate::satellite::camera::snap_camera;
use crate::satellite::components::{MainCamera, SatelliteInstance};
use crate::satellite::instances::{ColorWrites, InstanceColor};
use crate::satellite::orbit_path::{OrbitOverlay, SelectAction, compute_orbit_path};
use crate::satellite::picking::{ndc_from_cursor, ray_from_ndc};
use crate::satellite::pipeline::TrackingPipeline;
use crate::satellite::resources::{InstanceEntities, InstancePalette};

/// Shared mesh and one unlit material per display class.
pub fn setup_instance_palette(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(1.0).mesh().uv(12, 8));
    let materials = InstanceColor::ALL
        .into_iter()
        .map(|c| {
            let handle = materials.add(StandardMaterial {
                base_color: c.to_color(),
                unlit: true,
                ..default()
            });
            (c, handle)
        })
        .collect();
    commands.insert_resource(InstancePalette { mesh, materials });
}

/// Rebuild the instance entities whenever a new catalog lands.
pub fn spawn_instances_on_catalog(
    mut commands: Commands,
    catalog: Res<Catalog>,
    palette: Res<InstancePalette>,
    mut pipeline: ResMut<TrackingPipeline>,
    mut entities: ResMut<InstanceEntities>,
    mut overlay: ResMut<OrbitOverlay>,
) {
    if !catalog.is_changed() || catalog.is_empty() {
        return;
    }

    for e in entities.0.drain(..) {
        commands.entity(e).despawn();
    }
    pipeline.reset(catalog.records());
    overlay.clear();

    let batch = pipeline.instances_mut();
    for i in 0..catalog.len() {
        let material = batch
            .color(i)
            .and_then(|c| palette.material(c))
            .unwrap_or_default();
        let transform = batch.transform(i).copied().unwrap_or_default();
        let e = commands
            .spawn((
                Mesh3d(palette.mesh.clone()),
                MeshMaterial3d(material),
                transform,
                SatelliteInstance(i),
            ))
            .id();
        entities.0.push(e);
    }
    info!("[SATELLITES] spawned {} instances", entities.0.len());
}

pub fn apply_propagation_results(
    mut scheduler: ResMut<PropagationScheduler>,
    mut pipeline: ResMut<TrackingPipeline>,
) {
    for event in scheduler.poll() {
        match event {
            SchedulerEvent::Ready { count, failed } => {
                info!("[SATELLITES] propagation ready: {} objects, {} failed", count, failed);
            }
            SchedulerEvent::Positions(buffer) => {
                if buffer.len() == pipeline.len() {
                    debug!("[SATELLITES] positions valid={}/{}", buffer.valid_count(), buffer.len());
                    pipeline.apply_positions(buffer);
                } else {
                    debug!(
                        "[SATELLITES] dropping stale buffer ({} != {})",
                        buffer.len(),
                        pipeline.len()
                    );
                }
            }
        }
    }
}

pub fn update_instance_scale(
    mut pipeline: ResMut<TrackingPipeline>,
    q_camera: Query<&GlobalTransform, With<MainCamera>>,
) {
    if let Ok(cam) = q_camera.single() {
        pipeline.update_scale(cam.translation().length());
    }
}

/// Copy dirty batch state onto the instance entities.
pub fn mirror_instances(
    mut pipeline: ResMut<TrackingPipeline>,
    entities: Res<InstanceEntities>,
    palette: Res<InstancePalette>,
    mut q: Query<(&mut Transform, &mut MeshMaterial3d<StandardMaterial>), With<SatelliteInstance>>,
) {
    let batch = pipeline.instances_mut();

    if batch.take_transforms_dirty() {
        for (i, e) in entities.0.iter().enumerate() {
            if let (Ok((mut t, _)), Some(src)) = (q.get_mut(*e), batch.transform(i)) {
                *t = *src;
            }
        }
    }

    let indices: Vec<usize> = match batch.take_color_writes() {
        ColorWrites::None => return,
        ColorWrites::All => (0..entities.0.len()).collect(),
        ColorWrites::Some(v) => v,
    };
    for i in indices {
        let Some(e) = entities.0.get(i) else {
            continue;
        };
        let Some(handle) = batch.color(i).and_then(|c| palette.material(c)) else {
            continue;
        };
        if let Ok((_, mut mat)) = q.get_mut(*e)
            && mat.0 != handle
        {
            mat.0 = handle;
        }
    }
}

/// Re-pick on every cursor move; clear when the cursor leaves the window.
pub fn hover_system(
    mut moved: MessageReader<CursorMoved>,
    mut left: MessageReader<CursorLeft>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    catalog: Res<Catalog>,
    mut pipeline: ResMut<TrackingPipeline>,
) {
    let cursor_left = left.read().count() > 0;
    let cursor_moved = moved.read().count() > 0;
    if cursor_left {
        pipeline.set_hovered(None);
        return;
    }
    if !cursor_moved {
        return;
    }
    let hit = pick_under_cursor(&q_window, &q_camera, &pipeline);
    if pipeline.set_hovered(hit)
        && let Some(rec) = hit.and_then(|i| catalog.get(i))
    {
        debug!("[HOVER] {} ({})", rec.name, rec.id);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn click_select_system(
    mouse: Res<ButtonInput<MouseButton>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_orbit: Query<&mut PanOrbitCamera, With<MainCamera>>,
    catalog: Res<Catalog>,
    config: Res<ViewerConfig>,
    sim_time: Res<SimulationTime>,
    mut pipeline: ResMut<TrackingPipeline>,
    mut overlay: ResMut<OrbitOverlay>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(index) = pick_under_cursor(&q_window, &q_camera, &pipeline) else {
        return;
    };
    select_index(
        index,
        &catalog,
        &config,
        &sim_time,
        &mut pipeline,
        &mut overlay,
        q_orbit.single_mut().ok().as_deref_mut(),
    );
}

/// Escape drops the selection and its overlay.
pub fn clear_selection_system(
    input: Res<ButtonInput<KeyCode>>,
    mut pipeline: ResMut<TrackingPipeline>,
    mut overlay: ResMut<OrbitOverlay>,
) {
    if input.just_pressed(KeyCode::Escape) && pipeline.set_selected(None) {
        overlay.clear();
        info!("[SELECT] cleared");
    }
}

/// Select the configured object once the first positions are in.
#[allow(clippy::too_many_arguments)]
pub fn select_on_start_system(
    mut done: Local<bool>,
    catalog: Res<Catalog>,
    config: Res<ViewerConfig>,
    sim_time: Res<SimulationTime>,
    mut pipeline: ResMut<TrackingPipeline>,
    mut overlay: ResMut<OrbitOverlay>,
    mut q_orbit: Query<&mut PanOrbitCamera, With<MainCamera>>,
) {
    if *done || pipeline.positions().is_empty() {
        return;
    }
    *done = true;
    let Some(query) = config.select_on_start.as_deref() else {
        return;
    };

    let candidates = catalog.search(query, DEFAULT_SEARCH_LIMIT);
    for hit in &candidates {
        debug!("[SEARCH] {:?} -> {} ({})", query, hit.name, hit.id);
    }
    match catalog.search_first(query) {
        Some(index) => select_index(
            index,
            &catalog,
            &config,
            &sim_time,
            &mut pipeline,
            &mut overlay,
            q_orbit.single_mut().ok().as_deref_mut(),
        ),
        None => warn!("[SEARCH] nothing matches {:?}", query),
    }
}

/// Apply a selection of `index`: overlay toggle, recolor, camera framing.
pub fn select_index(
    index: usize,
    catalog: &Catalog,
    config: &ViewerConfig,
    sim_time: &SimulationTime,
    pipeline: &mut TrackingPipeline,
    overlay: &mut OrbitOverlay,
    camera: Option<&mut PanOrbitCamera>,
) {
    let Some(record) = catalog.get(index) else {
        return;
    };
    let frame = *pipeline.frame();
    let action = overlay.handle_select(pipeline.selected(), index, || {
        compute_orbit_path(record, sim_time.current_utc, config.orbit_path_points, &frame)
    });
    if action == SelectAction::HideOverlay {
        debug!("[SELECT] orbit overlay hidden for {}", record.name);
        return;
    }

    pipeline.set_selected(Some(index));
    info!("[SELECT] {} ({})", record.name, record.id);
    if overlay.owner() == Some(index) {
        debug!("[ORBIT] path revision {} for {}", overlay.revision(), record.name);
    }
    if let Some(stats) = pipeline.live_stats(index) {
        debug!(
            "[TELEMETRY] {} lat={:.2} lon={:.2} alt={:.1}km",
            record.name, stats.latitude_deg, stats.longitude_deg, stats.altitude_km
        );
    }

    if let (Some(p), Some(poc)) = (pipeline.position(index), camera) {
        snap_camera(poc, p, p, config.camera.select_offset);
    }
}

fn pick_under_cursor(
    q_window: &Query<&Window, With<PrimaryWindow>>,
    q_camera: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    pipeline: &TrackingPipeline,
) -> Option<usize> {
    let window = q_window.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, cam_transform) = q_camera.single().ok()?;
    let ndc = ndc_from_cursor(cursor, window.size());
    let ray = ray_from_ndc(camera, cam_transform, ndc)?;
    pipeline.pick(&ray, cam_transform.translation())
}
