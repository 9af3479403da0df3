//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only; no wall clock
//! - Seeded RNG only
//! - Stable obstacle order (by x, then ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod combo;
pub mod events;
pub mod state;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use collision::{Aabb, Collision, Contact, RampSurface};
pub use combo::{ComboAction, ComboEngine, ComboSnapshot, SpecialCombo, multiplier_for_streak};
pub use events::{FrameEvents, GameEvent};
pub use state::{GamePhase, GameState, Obstacle, ObstacleKind, Snapshot, difficulty_for_distance};
pub use tick::{TickInput, tick};
pub use track::{TrackGenerator, TrackPattern};
pub use vehicle::{DriveControls, Vehicle};
