use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod catalog;
mod config;
mod core;
mod orbital;
mod propagation;
mod satellite;
mod tle;

use catalog::CatalogPlugin;
use config::ViewerConfig;
use orbital::{OrbitalPlugin, SimulationTime};
use propagation::PropagationPlugin;
use satellite::{MainCamera, SatellitePlugin};

pub fn setup(
    mut commands: Commands,
    config: Res<ViewerConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(GlobalAmbientLight {
        brightness: 150.0,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(config.globe_radius).mesh().uv(64, 32))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.05, 0.12, 0.25),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::IDENTITY,
        Name::new("Globe"),
    ));

    let distance = config.initial_camera_distance;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 45f32.to_radians(),
            near: 1.0,
            far: 200_000.0,
            ..default()
        }),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        PanOrbitCamera {
            focus: Vec3::ZERO,
            radius: Some(distance),
            yaw: Some(0.0),
            pitch: Some(0.0),
            force_update: true,
            ..default()
        },
        MainCamera,
        Tonemapping::TonyMcMapface,
        Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(1.0, 0.5, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn main() {
    let (config, config_warning) = ViewerConfig::load();
    let mut sim_time = SimulationTime::default();
    sim_time.set_time_scale(config.time_scale);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Bevy Orbits".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    app.insert_resource(config)
        .insert_resource(sim_time)
        .add_plugins(PanOrbitCameraPlugin)
        .add_plugins(OrbitalPlugin)
        .add_plugins(CatalogPlugin)
        .add_plugins(PropagationPlugin)
        .add_plugins(SatellitePlugin)
        .add_systems(Startup, setup)
        .add_systems(Startup, move |config: Res<ViewerConfig>| {
            if let Some(w) = &config_warning {
                warn!("[CONFIG] {}", w);
            }
            match &config.source {
                Some(path) => info!("[CONFIG] loaded {}", path.display()),
                None => info!("[CONFIG] using defaults"),
            }
        });

    app.run();
}
