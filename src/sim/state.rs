//! Game state and core simulation types
//!
//! One `GameState` is one run. It owns every mutable piece of the simulation,
//! so several runs can be stepped side by side.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::{ComboEngine, ComboSnapshot};
use super::track::TrackGenerator;
use super::vehicle::Vehicle;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the start input
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused; ticks do nothing until resumed
    Paused,
    /// Run ended in a crash
    GameOver,
}

/// Hitbox shrink for obstacles whose silhouette doesn't fill their box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInset {
    /// Moved in from the left edge
    pub left: f32,
    /// Total width removed
    pub width: f32,
    /// Moved down from the top edge
    pub top: f32,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Log,
    Wall,
    /// Low and wet: can be jumped over without touching
    Puddle,
    BigRock,
    HighWall,
    Mud,
    Sand,
    Fence,
    Sign,
    /// Sloped, launches the vehicle instead of blocking it
    Ramp,
}

impl ObstacleKind {
    /// Kinds picked by the plain obstacle spawner
    pub const SPAWNABLE: [ObstacleKind; 10] = [
        ObstacleKind::Rock,
        ObstacleKind::Log,
        ObstacleKind::Wall,
        ObstacleKind::Puddle,
        ObstacleKind::BigRock,
        ObstacleKind::HighWall,
        ObstacleKind::Mud,
        ObstacleKind::Sand,
        ObstacleKind::Fence,
        ObstacleKind::Sign,
    ];

    /// Default (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            ObstacleKind::Rock => (40.0, 30.0),
            ObstacleKind::Log => (35.0, 25.0),
            ObstacleKind::Wall => (60.0, 40.0),
            ObstacleKind::Puddle => (55.0, 35.0),
            ObstacleKind::BigRock => (80.0, 50.0),
            ObstacleKind::HighWall => (70.0, 45.0),
            ObstacleKind::Mud => (120.0, 30.0),
            ObstacleKind::Sand => (110.0, 25.0),
            ObstacleKind::Fence => (50.0, 70.0),
            ObstacleKind::Sign => (45.0, 65.0),
            ObstacleKind::Ramp => (70.0, 30.0),
        }
    }

    #[inline]
    pub fn is_ramp(&self) -> bool {
        *self == ObstacleKind::Ramp
    }

    /// Irregular shapes get a smaller hitbox than their drawn box
    pub fn collision_inset(&self) -> Option<CollisionInset> {
        match self {
            ObstacleKind::Rock | ObstacleKind::Log => Some(CollisionInset {
                left: 5.0,
                width: 10.0,
                top: 5.0,
            }),
            _ => None,
        }
    }

    /// Whether an airborne vehicle passes over without contact
    pub fn ignored_while_airborne(&self) -> bool {
        *self == ObstacleKind::Puddle
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "rock",
            ObstacleKind::Log => "log",
            ObstacleKind::Wall => "wall",
            ObstacleKind::Puddle => "puddle",
            ObstacleKind::BigRock => "bigrock",
            ObstacleKind::HighWall => "highwall",
            ObstacleKind::Mud => "mud",
            ObstacleKind::Sand => "sand",
            ObstacleKind::Fence => "fence",
            ObstacleKind::Sign => "sign",
            ObstacleKind::Ramp => "ramp",
        }
    }
}

/// An obstacle or ramp on the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Set once when the vehicle has cleared it
    pub passed: bool,
    /// Set once a ramp has launched the vehicle; spent ramps are inert
    pub launched: bool,
}

impl Obstacle {
    /// Obstacle of default size resting on the track surface
    pub fn new(id: u32, kind: ObstacleKind, x: f32) -> Self {
        let (width, height) = kind.size();
        Self::with_size(id, kind, x, width, height)
    }

    /// Obstacle with explicit dimensions resting on the track surface
    pub fn with_size(id: u32, kind: ObstacleKind, x: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(x, TRACK_SURFACE - height),
            width,
            height,
            passed: false,
            launched: false,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }
}

/// Read-only view of a run for renderers and UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub time_ms: f64,
    pub distance: f32,
    pub difficulty: f32,
    pub score: u64,
    pub vehicle: Vehicle,
    pub obstacles: Vec<Obstacle>,
    pub combo: ComboSnapshot,
}

/// Difficulty for a cumulative distance: +20% every 5000 px
pub fn difficulty_for_distance(distance: f32) -> f32 {
    1.0 + (distance / DIFFICULTY_DISTANCE).floor() * DIFFICULTY_STEP
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the current run
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation clock; only advances while playing
    pub time_ms: f64,
    /// Tick counter (playing ticks only)
    pub time_ticks: u64,
    /// Cumulative distance travelled
    pub distance: f32,
    pub difficulty: f32,
    pub vehicle: Vehicle,
    pub track: TrackGenerator,
    pub combo: ComboEngine,
}

impl GameState {
    /// Create a new run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            track: TrackGenerator::new(&tuning),
            tuning,
            phase: GamePhase::Ready,
            time_ms: 0.0,
            time_ticks: 0,
            distance: 0.0,
            difficulty: 1.0,
            vehicle: Vehicle::new(),
            combo: ComboEngine::new(),
        }
    }

    /// Reinitialize to run-start values with a fresh seed drawn from this run
    pub fn reset(&mut self) {
        let seed = self.rng.random::<u64>();
        self.restart(seed);
    }

    /// Reinitialize to run-start values with an explicit seed
    pub fn restart(&mut self, seed: u64) {
        log::info!("Run reset with seed {}", seed);
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::with_tuning(seed, tuning);
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn score(&self) -> u64 {
        self.combo.score()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            time_ms: self.time_ms,
            distance: self.distance,
            difficulty: self.difficulty,
            score: self.score(),
            vehicle: self.vehicle.clone(),
            obstacles: self.track.obstacles().to_vec(),
            combo: self.combo.snapshot(),
        }
    }
}
