//! Satellite components for the Bevy ECS system

use bevy::prelude::*;

/// One rendered instance; the payload is its catalog index.
#[derive(Component, Copy, Clone, Debug)]
pub struct SatelliteInstance(pub usize);

/// Camera used for picking and scale.
#[derive(Component)]
pub struct MainCamera;
