//! Moto Runner - a side-scrolling motocross arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vehicle physics, track generation, collisions, combos)
//! - `tuning`: Data-driven physics and pacing constants
//!
//! Rendering, audio and input wiring live outside this crate. They drive
//! [`sim::tick`] once per frame and read [`sim::GameState::snapshot`] afterwards.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Units follow the arcade loop: distances in pixels, speeds in pixels per
/// tick, timestamps in milliseconds of simulation time.
pub mod consts {
    /// Nominal frame length used by the headless runner (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Largest delta accepted by a single tick, so a stalled frame can't warp timers
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Visible track width; new obstacles spawn at this x
    pub const TRACK_WIDTH: f32 = 800.0;

    /// Vehicle box
    pub const VEHICLE_X: f32 = 100.0;
    pub const VEHICLE_WIDTH: f32 = 80.0;
    pub const VEHICLE_HEIGHT: f32 = 50.0;
    /// Vehicle top edge when resting on the ground
    pub const GROUND_LEVEL: f32 = 300.0;
    /// Line the wheels and every obstacle base rest on
    pub const TRACK_SURFACE: f32 = GROUND_LEVEL + VEHICLE_HEIGHT;

    /// Vehicle dynamics (per tick)
    pub const MAX_SPEED: f32 = 15.0;
    pub const TURBO_SPEED_FACTOR: f32 = 1.5;
    pub const ACCELERATION: f32 = 0.3;
    pub const DECELERATION: f32 = 0.15;
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_FORCE: f32 = -12.0;
    /// Wheel phase advance per unit of speed (cosmetic)
    pub const WHEEL_SPIN_RATE: f32 = 0.2;
    /// Suspension compression applied on landing (cosmetic)
    pub const LANDING_SUSPENSION: f32 = 5.0;
    pub const SUSPENSION_RECOVERY: f32 = 0.5;

    /// Turbo must be held strictly longer than this to count as mastered
    pub const TURBO_MASTER_HOLD_MS: f64 = 2000.0;

    /// Obstacle pacing
    pub const BASE_SPAWN_INTERVAL_MS: f64 = 800.0;
    pub const OBSTACLE_SPAWN_CHANCE: f32 = 0.05;
    pub const RAMP_SPAWN_CHANCE: f32 = 0.02;
    pub const PATTERN_SPAWN_CHANCE: f32 = 0.1;

    /// Difficulty grows by `DIFFICULTY_STEP` every `DIFFICULTY_DISTANCE` pixels
    pub const DIFFICULTY_DISTANCE: f32 = 5000.0;
    pub const DIFFICULTY_STEP: f32 = 0.2;
    /// Patterns only appear above this difficulty
    pub const PATTERN_MIN_DIFFICULTY: f32 = 1.5;

    /// One point of baseline score per this many pixels travelled
    pub const DISTANCE_PER_POINT: f32 = 10.0;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_phase(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

/// Point on the segment `a -> b` at parameter `t` (unclamped)
#[inline]
pub fn lerp_point(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_phase(-0.5) - (TAU - 0.5)).abs() < 1e-5);
        assert_eq!(wrap_phase(0.0), 0.0);
    }

    #[test]
    fn test_lerp_point() {
        let p = lerp_point(Vec2::new(100.0, 310.0), Vec2::new(170.0, 280.0), 0.5);
        assert!((p.x - 135.0).abs() < 1e-4);
        assert!((p.y - 295.0).abs() < 1e-4);
    }
}
