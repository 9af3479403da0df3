//! Physics and pacing tuning
//!
//! Loaded once at startup. Defaults come from [`crate::consts`]; a JSON file
//! named by `MOTO_RUNNER_TUNING` may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Environment variable holding the path of a tuning JSON file
pub const TUNING_ENV_VAR: &str = "MOTO_RUNNER_TUNING";

/// Data-driven simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vehicle ===
    /// Top speed without turbo (pixels per tick)
    pub max_speed: f32,
    /// Throttle acceleration per tick (turbo and braking use twice this)
    pub acceleration: f32,
    /// Passive deceleration per tick when no control is held
    pub deceleration: f32,
    /// Downward acceleration while airborne
    pub gravity: f32,
    /// Initial vertical velocity of a jump (negative is up)
    pub jump_force: f32,

    // === Track ===
    /// Minimum time between spawns at zero speed
    pub base_spawn_interval_ms: f64,
    /// Spawn edge of the track
    pub track_width: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            deceleration: DECELERATION,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,

            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            track_width: TRACK_WIDTH,
        }
    }
}

impl Tuning {
    /// Top speed reachable with turbo held
    pub fn turbo_max_speed(&self) -> f32 {
        self.max_speed * TURBO_SPEED_FACTOR
    }

    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace values that would break the simulation with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            log::warn!("Invalid max_speed {}, using {}", self.max_speed, defaults.max_speed);
            self.max_speed = defaults.max_speed;
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            log::warn!("Invalid gravity {}, using {}", self.gravity, defaults.gravity);
            self.gravity = defaults.gravity;
        }
        if !(self.jump_force.is_finite() && self.jump_force < 0.0) {
            log::warn!("Invalid jump_force {}, using {}", self.jump_force, defaults.jump_force);
            self.jump_force = defaults.jump_force;
        }
        if !(self.acceleration.is_finite() && self.acceleration >= 0.0) {
            log::warn!("Invalid acceleration {}, using {}", self.acceleration, defaults.acceleration);
            self.acceleration = defaults.acceleration;
        }
        if !(self.deceleration.is_finite() && self.deceleration >= 0.0) {
            log::warn!("Invalid deceleration {}, using {}", self.deceleration, defaults.deceleration);
            self.deceleration = defaults.deceleration;
        }
        if !(self.base_spawn_interval_ms.is_finite() && self.base_spawn_interval_ms >= 0.0) {
            log::warn!(
                "Invalid base_spawn_interval_ms {}, using {}",
                self.base_spawn_interval_ms,
                defaults.base_spawn_interval_ms
            );
            self.base_spawn_interval_ms = defaults.base_spawn_interval_ms;
        }
        if !(self.track_width.is_finite() && self.track_width > VEHICLE_X + VEHICLE_WIDTH) {
            log::warn!("Invalid track_width {}, using {}", self.track_width, defaults.track_width);
            self.track_width = defaults.track_width;
        }
        self
    }

    /// Load tuning from the file named by `MOTO_RUNNER_TUNING`, or defaults
    pub fn load() -> Self {
        let Ok(path) = std::env::var(TUNING_ENV_VAR) else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Failed to parse tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}
