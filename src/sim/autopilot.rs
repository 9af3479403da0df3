//! Idle/demo mode driver
//!
//! Produces the controls a reasonable rider would hold this tick, from the
//! current state alone. Used by attract screens and the headless runner.

use super::collision::{obstacle_hitbox, vehicle_hitbox};
use super::state::{GamePhase, GameState, Obstacle};
use super::tick::TickInput;

/// Ticks into a jump before the vehicle is high enough to clear a tall obstacle
const JUMP_LEAD_TICKS: f32 = 8.0;
/// Turbo is held for this long out of every `TURBO_CYCLE_MS`
const TURBO_HOLD_MS: f64 = 2500.0;
const TURBO_CYCLE_MS: f64 = 10_000.0;

/// Nearest obstacle ahead that can still be hit; ramps launch on their own
fn next_threat(state: &GameState) -> Option<&Obstacle> {
    let rear = vehicle_hitbox(&state.vehicle).min.x;
    state
        .track
        .obstacles()
        .iter()
        .find(|o| !o.kind.is_ramp() && obstacle_hitbox(o).max.x > rear)
}

/// Controls for this tick
pub fn drive(state: &GameState) -> TickInput {
    let mut input = TickInput {
        right: true,
        start: state.phase == GamePhase::Ready,
        ..Default::default()
    };

    let vehicle = &state.vehicle;
    if let Some(obstacle) = next_threat(state) {
        let gap = obstacle_hitbox(obstacle).min.x - vehicle_hitbox(vehicle).max.x;
        let lead = vehicle.speed.max(1.0) * JUMP_LEAD_TICKS;
        input.jump = vehicle.is_grounded() && gap <= lead;
    }

    // Pulse turbo so long holds show up in the demo
    input.turbo = state.time_ms % TURBO_CYCLE_MS < TURBO_HOLD_MS;

    input
}
