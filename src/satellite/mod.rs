//! Satellite rendering and interaction
//!
//! Turns position buffers into a batch of instance entities and handles
//! hover, selection, the orbit overlay, and camera modes on top of it.

use bevy::prelude::*;

pub mod camera;
pub mod components;
pub mod instances;
pub mod orbit_path;
pub mod picking;
pub mod pipeline;
pub mod resources;
pub mod scale;
pub mod selection;
pub mod systems;

pub use camera::CameraMode;
pub use components::MainCamera;
pub use orbit_path::OrbitOverlay;
pub use pipeline::TrackingPipeline;

use crate::config::ViewerConfig;
use crate::core::space::SceneFrame;
use crate::propagation::PropagationSet;
use camera::{apply_camera_mode, camera_mode_controls};
use orbit_path::draw_selection_gizmos;
use resources::InstanceEntities;
use systems::{
    apply_propagation_results, clear_selection_system, click_select_system, hover_system,
    mirror_instances, select_on_start_system, setup_instance_palette, spawn_instances_on_catalog,
    update_instance_scale,
};

pub struct SatellitePlugin;

impl Plugin for SatellitePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InstanceEntities>()
            .init_resource::<OrbitOverlay>()
            .init_resource::<CameraMode>()
            .add_systems(Startup, (setup_tracking_pipeline, setup_instance_palette))
            .add_systems(
                Update,
                (
                    spawn_instances_on_catalog,
                    apply_propagation_results,
                    update_instance_scale,
                    (
                        hover_system,
                        click_select_system,
                        clear_selection_system,
                        select_on_start_system,
                    ),
                    camera_mode_controls,
                    apply_camera_mode,
                    mirror_instances,
                    draw_selection_gizmos,
                )
                    .chain()
                    .after(PropagationSet),
            );
    }
}

fn setup_tracking_pipeline(mut commands: Commands, config: Res<ViewerConfig>) {
    commands.insert_resource(TrackingPipeline::new(
        SceneFrame::new(config.globe_radius),
        config.scale,
        config.picking,
    ));
}
