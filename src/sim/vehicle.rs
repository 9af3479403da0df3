//! The player's motorbike
//!
//! Physics runs in fixed per-tick units: speeds are pixels per tick and
//! gravity is applied once per tick, so the frame delta only matters for
//! turbo timing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;
use crate::wrap_phase;

/// Held throttle controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveControls {
    pub accelerate: bool,
    pub brake: bool,
}

/// Result of advancing the vehicle by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VehicleStep {
    /// Horizontal distance covered this tick
    pub distance: f32,
    /// Touched down after a jump that was initiated (by the rider or a ramp)
    pub landed: bool,
}

/// Turbo released after a hold longer than [`TURBO_MASTER_HOLD_MS`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurboMastered {
    pub duration_ms: f64,
    pub speed: f32,
}

/// The player vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Horizontal speed, always within [0, turbo max]
    pub speed: f32,
    /// Vertical velocity (negative is up)
    pub vel_y: f32,
    pub jumping: bool,
    pub crouching: bool,
    pub turbo_active: bool,
    /// Simulation time the current turbo hold began
    pub turbo_started_ms: Option<f64>,
    /// Set by a jump, cleared by the landing that scores it
    pub jump_initiated: bool,
    /// Wheel rotation in [0, 2π) (cosmetic)
    pub wheel_phase: f32,
    /// Landing compression, recovers while grounded (cosmetic)
    pub suspension: f32,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self::new()
    }
}

impl Vehicle {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(VEHICLE_X, GROUND_LEVEL),
            width: VEHICLE_WIDTH,
            height: VEHICLE_HEIGHT,
            speed: 0.0,
            vel_y: 0.0,
            jumping: false,
            crouching: false,
            turbo_active: false,
            turbo_started_ms: None,
            jump_initiated: false,
            wheel_phase: 0.0,
            suspension: 0.0,
        }
    }

    /// Back to run-start values
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        !self.jumping
    }

    /// Bottom edge (where the wheels touch)
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    /// Front wheel contact point
    pub fn front_wheel(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.width * 0.7, self.bottom())
    }

    /// Rear wheel contact point
    pub fn rear_wheel(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.width * 0.3, self.bottom())
    }

    /// Advance one tick: gravity, landing, throttle and cosmetic state
    pub fn update(&mut self, tuning: &Tuning, controls: DriveControls) -> VehicleStep {
        let mut step = VehicleStep::default();

        if self.jumping {
            self.vel_y += tuning.gravity;
            self.pos.y += self.vel_y;

            if self.pos.y >= GROUND_LEVEL {
                self.pos.y = GROUND_LEVEL;
                self.jumping = false;
                self.vel_y = 0.0;
                self.suspension = LANDING_SUSPENSION;

                if self.jump_initiated {
                    self.jump_initiated = false;
                    step.landed = true;
                }
            }
        } else if self.suspension > 0.0 {
            self.suspension = (self.suspension - SUSPENSION_RECOVERY).max(0.0);
        }

        let turbo_max = tuning.turbo_max_speed();
        if self.turbo_active && self.speed < turbo_max {
            self.speed += tuning.acceleration * 2.0;
        } else if controls.accelerate && self.speed < tuning.max_speed {
            self.speed += tuning.acceleration;
        } else if controls.brake && self.speed > 0.0 {
            self.speed -= tuning.acceleration * 2.0;
        } else if self.speed > 0.0 {
            self.speed -= tuning.deceleration;
        }
        self.speed = self.speed.clamp(0.0, turbo_max);

        self.wheel_phase = wrap_phase(self.wheel_phase + self.speed * WHEEL_SPIN_RATE);

        step.distance = self.speed;
        step
    }

    /// Rider-initiated jump; only from the ground and not while crouched.
    ///
    /// Control methods assume a running game: `tick` only forwards controls
    /// while the phase is `Playing`.
    pub(crate) fn jump(&mut self, tuning: &Tuning) -> bool {
        if self.jumping || self.crouching {
            return false;
        }
        self.start_jump(tuning);
        true
    }

    /// Forced jump when a ramp boards the vehicle; stands the rider up
    pub(crate) fn launch_from_ramp(&mut self, tuning: &Tuning) -> bool {
        if self.jumping {
            return false;
        }
        self.crouching = false;
        self.start_jump(tuning);
        true
    }

    fn start_jump(&mut self, tuning: &Tuning) {
        self.jumping = true;
        self.jump_initiated = true;
        self.vel_y = tuning.jump_force;
    }

    pub(crate) fn crouch(&mut self) -> bool {
        if self.jumping || self.crouching {
            return false;
        }
        self.crouching = true;
        true
    }

    pub(crate) fn stand(&mut self) -> bool {
        std::mem::replace(&mut self.crouching, false)
    }

    pub(crate) fn activate_turbo(&mut self, now_ms: f64) -> bool {
        if self.turbo_active {
            return false;
        }
        self.turbo_active = true;
        self.turbo_started_ms = Some(now_ms);
        true
    }

    /// Release turbo; a hold longer than two seconds is reported
    pub(crate) fn deactivate_turbo(&mut self, now_ms: f64) -> Option<TurboMastered> {
        if !self.turbo_active {
            return None;
        }
        let started = self.turbo_started_ms.take();
        self.turbo_active = false;

        let duration_ms = now_ms - started?;
        (duration_ms > TURBO_MASTER_HOLD_MS).then_some(TurboMastered {
            duration_ms,
            speed: self.speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const THROTTLE: DriveControls = DriveControls {
        accelerate: true,
        brake: false,
    };

    #[test]
    fn test_jump_arc_lands_and_reports_once() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        assert!(bike.jump(&tuning));
        assert!(!bike.jump(&tuning), "No double jump while airborne");

        let mut landings = 0;
        let mut peak = GROUND_LEVEL;
        for _ in 0..100 {
            let step = bike.update(&tuning, DriveControls::default());
            peak = peak.min(bike.pos.y);
            if step.landed {
                landings += 1;
            }
        }
        assert_eq!(landings, 1);
        assert!(bike.is_grounded());
        assert_eq!(bike.pos.y, GROUND_LEVEL);
        // v²/2g = 144 / 1.2
        assert!((GROUND_LEVEL - peak - 120.0).abs() < 12.0, "peak height was {}", GROUND_LEVEL - peak);
    }

    #[test]
    fn test_cannot_jump_while_crouching() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        assert!(bike.crouch());
        assert!(!bike.jump(&tuning));
        assert!(!bike.jumping);

        // A ramp still launches a crouching rider
        assert!(bike.launch_from_ramp(&tuning));
        assert!(bike.jumping);
        assert!(!bike.crouching);
    }

    #[test]
    fn test_crouch_only_on_ground() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        bike.jump(&tuning);
        assert!(!bike.crouch());
        assert!(!bike.stand());
    }

    #[test]
    fn test_throttle_caps_at_max_speed() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        for _ in 0..200 {
            bike.update(&tuning, THROTTLE);
        }
        assert!(bike.speed <= tuning.max_speed + tuning.acceleration);
        assert!(bike.speed >= tuning.max_speed - tuning.deceleration - 1e-3);
    }

    #[test]
    fn test_turbo_exceeds_max_speed() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        bike.activate_turbo(0.0);
        for _ in 0..200 {
            bike.update(&tuning, DriveControls::default());
        }
        assert!(bike.speed > tuning.max_speed);
        assert!(bike.speed <= tuning.turbo_max_speed());
    }

    #[test]
    fn test_brake_is_twice_acceleration() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        bike.speed = 10.0;
        bike.update(
            &tuning,
            DriveControls {
                accelerate: false,
                brake: true,
            },
        );
        assert!((bike.speed - (10.0 - tuning.acceleration * 2.0)).abs() < 1e-5);

        bike.update(&tuning, DriveControls::default());
        assert!((bike.speed - (10.0 - tuning.acceleration * 2.0 - tuning.deceleration)).abs() < 1e-5);
    }

    #[test]
    fn test_turbo_mastered_threshold() {
        let mut bike = Vehicle::new();
        bike.speed = 18.0;

        assert!(bike.activate_turbo(1000.0));
        assert!(!bike.activate_turbo(1500.0), "Already active");
        assert_eq!(bike.deactivate_turbo(3000.0), None, "Exactly two seconds is not enough");

        bike.activate_turbo(5000.0);
        let mastered = bike.deactivate_turbo(7500.0).unwrap();
        assert_eq!(mastered.duration_ms, 2500.0);
        assert_eq!(mastered.speed, 18.0);
        assert!(!bike.turbo_active);
        assert_eq!(bike.turbo_started_ms, None);

        assert_eq!(bike.deactivate_turbo(9000.0), None, "Not active");
    }

    #[test]
    fn test_wheel_phase_wraps() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        bike.activate_turbo(0.0);
        for _ in 0..500 {
            bike.update(&tuning, DriveControls::default());
            assert!((0.0..std::f32::consts::TAU).contains(&bike.wheel_phase));
        }
    }

    #[test]
    fn test_suspension_recovers() {
        let tuning = Tuning::default();
        let mut bike = Vehicle::new();
        bike.jump(&tuning);
        while !bike.update(&tuning, DriveControls::default()).landed {}
        assert_eq!(bike.suspension, LANDING_SUSPENSION);
        for _ in 0..20 {
            bike.update(&tuning, DriveControls::default());
        }
        assert_eq!(bike.suspension, 0.0);
    }

    proptest! {
        #[test]
        fn prop_speed_and_height_stay_in_bounds(
            controls in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..400)
        ) {
            let tuning = Tuning::default();
            let mut bike = Vehicle::new();
            let mut now = 0.0;
            for (accelerate, brake, jump, turbo) in controls {
                now += FRAME_MS;
                if jump {
                    bike.jump(&tuning);
                }
                if turbo {
                    bike.activate_turbo(now);
                } else {
                    bike.deactivate_turbo(now);
                }
                bike.update(&tuning, DriveControls { accelerate, brake });

                prop_assert!(bike.speed >= 0.0);
                prop_assert!(bike.speed <= tuning.turbo_max_speed());
                prop_assert!(bike.pos.y <= GROUND_LEVEL);
                if !bike.jumping {
                    prop_assert_eq!(bike.pos.y, GROUND_LEVEL);
                }
            }
        }
    }
}
