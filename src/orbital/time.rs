//! Time management for orbital mechanics

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};

pub const MIN_TIME_SCALE: f32 = 1.0;
pub const MAX_TIME_SCALE: f32 = 500.0;

/// Simulation time resource
#[derive(Resource)]
pub struct SimulationTime {
    pub current_utc: DateTime<Utc>,
    pub time_scale: f32,
    pub paused: bool,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self {
            current_utc: Utc::now(),
            time_scale: 1.0,
            paused: false,
        }
    }
}

impl SimulationTime {
    /// Advance by `real_secs` of wall time, scaled. No-op while paused.
    pub fn advance(&mut self, real_secs: f32) {
        if self.paused {
            return;
        }
        let scaled = (real_secs * self.time_scale).max(0.0);
        let whole = scaled.trunc() as i64;
        let nanos = ((scaled - scaled.trunc()) * 1_000_000_000.0) as i64;
        if whole != 0 {
            self.current_utc += Duration::seconds(whole);
        }
        if nanos != 0 {
            self.current_utc += Duration::nanoseconds(nanos);
        }
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
    }

    pub fn reset_to(&mut self, now: DateTime<Utc>) {
        self.current_utc = now;
    }
}

/// System to advance simulation UTC by scale
pub fn advance_simulation_clock(time: Res<Time>, mut sim_time: ResMut<SimulationTime>) {
    sim_time.advance(time.delta_secs());
}

/// Space pauses, R resets to wall-clock now, `[` / `]` halve or double the time scale.
pub fn simulation_clock_controls(
    input: Res<ButtonInput<KeyCode>>,
    mut sim_time: ResMut<SimulationTime>,
) {
    if input.just_pressed(KeyCode::Space) {
        sim_time.paused = !sim_time.paused;
        info!("Simulation {}", if sim_time.paused { "paused" } else { "resumed" });
    }
    if input.just_pressed(KeyCode::KeyR) {
        sim_time.reset_to(Utc::now());
        info!("Simulation time reset to {}", sim_time.current_utc.to_rfc3339());
    }
    if input.just_pressed(KeyCode::BracketRight) {
        let next = sim_time.time_scale * 2.0;
        sim_time.set_time_scale(next);
        info!("Time scale x{}", sim_time.time_scale);
    }
    if input.just_pressed(KeyCode::BracketLeft) {
        let next = sim_time.time_scale * 0.5;
        sim_time.set_time_scale(next);
        info!("Time scale x{}", sim_time.time_scale);
    }
}
