//! Orbital mechanics module
//!
//! Simulation clock plus single-object SGP4 propagation into the Earth-fixed
//! frame. Frame math lives in `crate::core::coordinates`.

use bevy::prelude::*;

pub mod propagation;
pub mod time;

pub use propagation::propagate_ecef_km;
pub use time::{SimulationTime, advance_simulation_clock, simulation_clock_controls};

/// Plugin for orbital mechanics and time management
pub struct OrbitalPlugin;

impl Plugin for OrbitalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTime>().add_systems(
            Update,
            (
                simulation_clock_controls,
                advance_simulation_clock.after(simulation_clock_controls),
            ),
        );
    }
}
