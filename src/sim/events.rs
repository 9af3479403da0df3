//! Discrete events produced by a simulation tick
//!
//! Renderers and audio read these after each tick to trigger effects; the
//! simulation itself never looks at them again.

use serde::{Deserialize, Serialize};

use super::combo::SpecialCombo;
use super::state::ObstacleKind;

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Run started from the ready screen
    Started,
    Paused,
    Resumed,
    /// Vehicle touched down after a jump it initiated
    Landed { points: u64 },
    /// Vehicle cleared a non-ramp obstacle
    Dodged {
        kind: ObstacleKind,
        speed: f32,
        points: u64,
    },
    /// Vehicle boarded a ramp and was launched
    RampJump { points: u64 },
    /// Turbo released after a long hold
    TurboMastered {
        duration_ms: f64,
        speed: f32,
        points: u64,
    },
    /// Rare bonus awarded on top of the streak
    SpecialCombo { combo: SpecialCombo, bonus: u64 },
    /// Difficulty stepped up
    DifficultyUp { difficulty: f32 },
    /// Vehicle hit a blocking obstacle; the run is over
    Crash { kind: ObstacleKind },
}

impl GameEvent {
    /// Points this event added to the score
    pub fn points(&self) -> u64 {
        match self {
            GameEvent::Landed { points }
            | GameEvent::Dodged { points, .. }
            | GameEvent::RampJump { points }
            | GameEvent::TurboMastered { points, .. } => *points,
            GameEvent::SpecialCombo { bonus, .. } => *bonus,
            _ => 0,
        }
    }
}

/// Ordered events of one tick, stamped with the simulation time they occurred at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameEvents {
    pub at_ms: f64,
    pub events: Vec<GameEvent>,
}

impl FrameEvents {
    pub fn new(at_ms: f64) -> Self {
        Self {
            at_ms,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Whether the run ended this tick
    pub fn crashed(&self) -> bool {
        self.events.iter().any(|e| matches!(e, GameEvent::Crash { .. }))
    }

    /// Special combos triggered this tick
    pub fn specials(&self) -> impl Iterator<Item = (SpecialCombo, u64)> + '_ {
        self.events.iter().filter_map(|e| match e {
            GameEvent::SpecialCombo { combo, bonus } => Some((*combo, *bonus)),
            _ => None,
        })
    }

    /// Total points awarded this tick
    pub fn points(&self) -> u64 {
        self.events.iter().map(GameEvent::points).sum()
    }
}

impl<'a> IntoIterator for &'a FrameEvents {
    type Item = &'a GameEvent;
    type IntoIter = std::slice::Iter<'a, GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
