//! Background SGP4 propagation
//!
//! A single worker thread owns the decoded element sets and answers
//! timestamped requests with a full position buffer.

use bevy::prelude::*;

pub mod buffer;
pub mod scheduler;
pub mod worker;

pub use buffer::PositionBuffer;
pub use scheduler::{
    PropagationScheduler, SchedulerEvent, request_propagation, start_propagation_on_catalog,
};

/// Sets for ordering consumers after the request system.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropagationSet;

pub struct PropagationPlugin;

impl Plugin for PropagationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PropagationScheduler>().add_systems(
            Update,
            (start_propagation_on_catalog, request_propagation)
                .chain()
                .in_set(PropagationSet)
                .after(crate::orbital::advance_simulation_clock),
        );
    }
}
