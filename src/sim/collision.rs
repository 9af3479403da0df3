//! Collision detection between the vehicle and track pieces
//!
//! Two geometry modes: inset axis-aligned boxes for blocking obstacles, and a
//! sloped line tested against the wheel contact points for ramps. Ramps never
//! end the run; touching one from the ground launches the vehicle.

use glam::Vec2;

use super::state::{Obstacle, ObstacleKind};
use super::vehicle::Vehicle;
use crate::lerp_point;

/// Horizontal margin trimmed from both sides of the vehicle hitbox
pub const HITBOX_MARGIN: f32 = 10.0;
/// Fraction of the vehicle height kept while crouching
pub const CROUCH_HEIGHT_FACTOR: f32 = 0.7;
/// How far above the ramp surface a wheel may float and still board it
pub const RAMP_TOLERANCE: f32 = 10.0;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Strict overlap; touching edges don't count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Vehicle hitbox: inset horizontally, lowered and shortened when crouching
pub fn vehicle_hitbox(vehicle: &Vehicle) -> Aabb {
    let (y, height) = if vehicle.crouching {
        (
            vehicle.pos.y + vehicle.height * (1.0 - CROUCH_HEIGHT_FACTOR),
            vehicle.height * CROUCH_HEIGHT_FACTOR,
        )
    } else {
        (vehicle.pos.y, vehicle.height)
    };
    Aabb::from_rect(
        vehicle.pos.x + HITBOX_MARGIN,
        y,
        vehicle.width - HITBOX_MARGIN * 2.0,
        height,
    )
}

/// Obstacle hitbox with the kind's silhouette inset applied
pub fn obstacle_hitbox(obstacle: &Obstacle) -> Aabb {
    match obstacle.kind.collision_inset() {
        Some(inset) => Aabb::from_rect(
            obstacle.pos.x + inset.left,
            obstacle.pos.y + inset.top,
            obstacle.width - inset.width,
            obstacle.height - inset.top,
        ),
        None => Aabb::from_rect(obstacle.pos.x, obstacle.pos.y, obstacle.width, obstacle.height),
    }
}

/// Sloped ramp surface from its low front edge to its high back edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampSurface {
    /// (x, y_bottom)
    pub start: Vec2,
    /// (x + width, y_top)
    pub end: Vec2,
}

impl RampSurface {
    pub fn new(x: f32, width: f32, y_top: f32, y_bottom: f32) -> Self {
        Self {
            start: Vec2::new(x, y_bottom),
            end: Vec2::new(x + width, y_top),
        }
    }

    pub fn from_obstacle(obstacle: &Obstacle) -> Self {
        Self::new(obstacle.pos.x, obstacle.width, obstacle.pos.y, obstacle.bottom())
    }

    /// Surface height at `x`, if `x` lies within the ramp's span
    pub fn height_at(&self, x: f32) -> Option<f32> {
        if x < self.start.x || x > self.end.x {
            return None;
        }
        let t = (x - self.start.x) / (self.end.x - self.start.x);
        Some(lerp_point(self.start, self.end, t).y)
    }

    /// Whether a wheel contact point rests on (or has sunk into) the ramp
    pub fn supports(&self, wheel: Vec2) -> bool {
        match self.height_at(wheel.x) {
            Some(surface) => wheel.y >= surface - RAMP_TOLERANCE && wheel.y <= self.start.y + RAMP_TOLERANCE,
            None => false,
        }
    }
}

/// Either wheel on the ramp surface
pub fn wheels_on_ramp(vehicle: &Vehicle, ramp: &RampSurface) -> bool {
    ramp.supports(vehicle.front_wheel()) || ramp.supports(vehicle.rear_wheel())
}

/// Outcome of testing the vehicle against one obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Grounded vehicle boarded a ramp: forced jump
    RampJump,
    /// Blocking overlap: run over
    Crash,
}

/// Classify the vehicle against a single obstacle
pub fn check(vehicle: &Vehicle, obstacle: &Obstacle) -> Contact {
    if obstacle.kind.is_ramp() {
        let ramp = RampSurface::from_obstacle(obstacle);
        return if !obstacle.launched && vehicle.is_grounded() && wheels_on_ramp(vehicle, &ramp) {
            Contact::RampJump
        } else {
            Contact::None
        };
    }

    if vehicle.jumping && obstacle.kind.ignored_while_airborne() {
        return Contact::None;
    }

    if vehicle_hitbox(vehicle).overlaps(&obstacle_hitbox(obstacle)) {
        Contact::Crash
    } else {
        Contact::None
    }
}

/// A non-trivial contact found this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub obstacle_id: u32,
    pub kind: ObstacleKind,
    pub contact: Contact,
}

/// Check every obstacle in track order. A ramp launch makes the vehicle
/// airborne for the remaining checks; the first crash ends the scan.
pub fn resolve(vehicle: &Vehicle, obstacles: &[Obstacle]) -> Vec<Collision> {
    let mut probe = vehicle.clone();
    let mut collisions = Vec::new();

    for obstacle in obstacles {
        let contact = check(&probe, obstacle);
        if contact == Contact::None {
            continue;
        }
        collisions.push(Collision {
            obstacle_id: obstacle.id,
            kind: obstacle.kind,
            contact,
        });
        match contact {
            Contact::RampJump => {
                probe.jumping = true;
                probe.crouching = false;
            }
            Contact::Crash => break,
            Contact::None => {}
        }
    }

    collisions
}
