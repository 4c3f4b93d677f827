//! Render-side resources for the satellite batch

use bevy::prelude::*;
use std::collections::HashMap;

use crate::satellite::instances::InstanceColor;

/// Every instance shares this mesh and one of five materials, so the
/// renderer batches them.
#[derive(Resource)]
pub struct InstancePalette {
    pub mesh: Handle<Mesh>,
    pub materials: HashMap<InstanceColor, Handle<StandardMaterial>>,
}

impl InstancePalette {
    pub fn material(&self, color: InstanceColor) -> Option<Handle<StandardMaterial>> {
        self.materials.get(&color).cloned()
    }
}

/// Instance entities, indexed like the catalog.
#[derive(Resource, Default)]
pub struct InstanceEntities(pub Vec<Entity>);
