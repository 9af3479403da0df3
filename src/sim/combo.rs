//! Combo scoring
//!
//! A streak counter with a tiered multiplier, plus independent "special
//! combo" rules that watch the recent action history. The streak decays on a
//! timer, so [`ComboEngine::advance_time`] must run every tick even when no
//! action happened.

use serde::{Deserialize, Serialize};

use super::state::ObstacleKind;

/// Streak drops if no action lands within this window
pub const COMBO_TIMEOUT_MS: f64 = 3000.0;
/// Recent actions kept for pattern detection
pub const HISTORY_CAPACITY: usize = 10;

/// Base points per action
pub const JUMP_LAND_POINTS: u32 = 15;
pub const DODGE_POINTS: u32 = 20;
pub const RAMP_JUMP_POINTS: u32 = 30;
pub const TURBO_MASTER_POINTS: u32 = 25;

/// Dodges faster than this feed the speed demon counter
pub const HIGH_SPEED_DODGE: f32 = 12.0;
pub const PERFECT_LANDING_WINDOW_MS: f64 = 5000.0;
pub const SPEED_DEMON_WINDOW_MS: f64 = 10_000.0;
pub const AIR_MASTER_WINDOW_MS: f64 = 15_000.0;
pub const SLALOM_WINDOW_MS: f64 = 8000.0;
/// Distinct obstacle kinds a slalom must span
pub const SLALOM_DISTINCT_KINDS: usize = 4;

/// Multiplier for a streak length
pub fn multiplier_for_streak(streak: u32) -> f32 {
    match streak {
        0 | 1 => 1.0,
        2 => 1.5,
        3 => 2.0,
        4 => 2.5,
        5..=9 => 3.0,
        10..=14 => 4.0,
        _ => 5.0,
    }
}

/// A scoring action, with the context the special rules need
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ComboAction {
    /// Landed a jump
    JumpLand,
    /// Cleared an obstacle
    Dodge { obstacle: ObstacleKind, speed: f32 },
    /// Launched off a ramp
    RampJump,
    /// Held turbo for more than two seconds
    TurboMaster { duration_ms: f64, speed: f32 },
}

impl ComboAction {
    pub fn base_points(&self) -> u32 {
        match self {
            ComboAction::JumpLand => JUMP_LAND_POINTS,
            ComboAction::Dodge { .. } => DODGE_POINTS,
            ComboAction::RampJump => RAMP_JUMP_POINTS,
            ComboAction::TurboMaster { .. } => TURBO_MASTER_POINTS,
        }
    }

    fn is_fast_dodge(&self) -> bool {
        matches!(self, ComboAction::Dodge { speed, .. } if *speed > HIGH_SPEED_DODGE)
    }
}

/// An action as stored in the history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action: ComboAction,
    pub at_ms: f64,
    /// Monotonic per engine; orders records that share a timestamp
    pub seq: u64,
}

/// Fixed-size ring of the most recent actions, oldest evicted first
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    slots: [Option<ActionRecord>; HISTORY_CAPACITY],
    /// Next slot to write
    head: usize,
    len: usize,
}

impl ActionHistory {
    pub fn push(&mut self, record: ActionRecord) {
        self.slots[self.head] = Some(record);
        self.head = (self.head + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        let start = (self.head + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).filter_map(move |i| self.slots[(start + i) % HISTORY_CAPACITY].as_ref())
    }

    /// Records younger than `window_ms` at time `now_ms`
    pub fn within(&self, now_ms: f64, window_ms: f64) -> impl Iterator<Item = &ActionRecord> {
        self.iter().filter(move |r| now_ms - r.at_ms < window_ms)
    }
}

/// Rare bonuses layered on top of the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialCombo {
    PerfectLanding,
    SpeedDemon,
    AirMaster,
    ObstacleSlalom,
    TurboMaster,
}

impl SpecialCombo {
    pub const ALL: [SpecialCombo; 5] = [
        SpecialCombo::PerfectLanding,
        SpecialCombo::SpeedDemon,
        SpecialCombo::AirMaster,
        SpecialCombo::ObstacleSlalom,
        SpecialCombo::TurboMaster,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Progress needed to trigger
    pub fn threshold(&self) -> u32 {
        match self {
            SpecialCombo::PerfectLanding => 3,
            SpecialCombo::SpeedDemon => 5,
            SpecialCombo::AirMaster => 4,
            SpecialCombo::ObstacleSlalom => 6,
            SpecialCombo::TurboMaster => 1,
        }
    }

    pub fn bonus(&self) -> u64 {
        match self {
            SpecialCombo::PerfectLanding => 100,
            SpecialCombo::SpeedDemon => 200,
            SpecialCombo::AirMaster => 150,
            SpecialCombo::ObstacleSlalom => 250,
            SpecialCombo::TurboMaster => 180,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialCombo::PerfectLanding => "perfectLanding",
            SpecialCombo::SpeedDemon => "speedDemon",
            SpecialCombo::AirMaster => "airMaster",
            SpecialCombo::ObstacleSlalom => "obstacleSlalom",
            SpecialCombo::TurboMaster => "turboMaster",
        }
    }
}

/// Progress toward one special combo
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecialProgress {
    pub combo: SpecialCombo,
    pub count: u32,
    pub threshold: u32,
    pub bonus: u64,
}

impl SpecialProgress {
    fn new(combo: SpecialCombo) -> Self {
        Self {
            combo,
            count: 0,
            threshold: combo.threshold(),
            bonus: combo.bonus(),
        }
    }
}

/// Points awarded by one action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    /// Streak points: base × multiplier, floored
    pub points: u64,
    /// Special combos triggered by this action, with their bonus
    pub specials: Vec<(SpecialCombo, u64)>,
}

/// Serializable view of the combo state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboSnapshot {
    pub streak: u32,
    pub multiplier: f32,
    pub score: u64,
    pub last_action_ms: Option<f64>,
    pub recent: Vec<ActionRecord>,
    pub specials: Vec<SpecialProgress>,
}

/// The scoring state machine
#[derive(Debug, Clone)]
pub struct ComboEngine {
    streak: u32,
    multiplier: f32,
    last_action_ms: Option<f64>,
    history: ActionHistory,
    specials: [SpecialProgress; 5],
    last_fast_dodge_ms: Option<f64>,
    last_ramp_jump_ms: Option<f64>,
    next_seq: u64,
    score: u64,
}

impl Default for ComboEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComboEngine {
    pub fn new() -> Self {
        Self {
            streak: 0,
            multiplier: 1.0,
            last_action_ms: None,
            history: ActionHistory::default(),
            specials: SpecialCombo::ALL.map(SpecialProgress::new),
            last_fast_dodge_ms: None,
            last_ramp_jump_ms: None,
            next_seq: 1,
            score: 0,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn progress(&self, combo: SpecialCombo) -> &SpecialProgress {
        &self.specials[combo.index()]
    }

    /// Raise the score to at least `floor` (distance-based baseline)
    pub fn raise_score_floor(&mut self, floor: u64) {
        self.score = self.score.max(floor);
    }

    fn is_stale(&self, now_ms: f64) -> bool {
        self.last_action_ms
            .is_some_and(|last| now_ms - last > COMBO_TIMEOUT_MS)
    }

    /// Record a scoring action and award its points
    pub fn add_action(&mut self, action: ComboAction, base_points: u32, now_ms: f64) -> ActionOutcome {
        if self.is_stale(now_ms) {
            self.streak = 0;
        }

        self.streak += 1;
        self.last_action_ms = Some(now_ms);
        self.multiplier = multiplier_for_streak(self.streak);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.history.push(ActionRecord {
            action,
            at_ms: now_ms,
            seq,
        });

        let specials = self.check_specials(&action, now_ms);

        let points = (base_points as f32 * self.multiplier).floor() as u64;
        self.score += points;

        ActionOutcome { points, specials }
    }

    fn check_specials(&mut self, action: &ComboAction, now_ms: f64) -> Vec<(SpecialCombo, u64)> {
        let mut triggered = Vec::new();

        self.refresh_history_progress(now_ms);

        // Window rules fire on every qualifying action while the window holds
        if matches!(action, ComboAction::JumpLand) && self.reached(SpecialCombo::PerfectLanding) {
            triggered.push(self.trigger(SpecialCombo::PerfectLanding));
        }

        if action.is_fast_dodge() {
            self.last_fast_dodge_ms = Some(now_ms);
            self.specials[SpecialCombo::SpeedDemon.index()].count += 1;
            if self.reached(SpecialCombo::SpeedDemon) {
                triggered.push(self.trigger(SpecialCombo::SpeedDemon));
            }
        }

        if matches!(action, ComboAction::RampJump) {
            self.last_ramp_jump_ms = Some(now_ms);
            self.specials[SpecialCombo::AirMaster.index()].count += 1;
            if self.reached(SpecialCombo::AirMaster) {
                triggered.push(self.trigger(SpecialCombo::AirMaster));
            }
        }

        if matches!(action, ComboAction::Dodge { .. })
            && self.reached(SpecialCombo::ObstacleSlalom)
            && self.slalom_kinds(now_ms) >= SLALOM_DISTINCT_KINDS
        {
            triggered.push(self.trigger(SpecialCombo::ObstacleSlalom));
        }

        if matches!(action, ComboAction::TurboMaster { .. }) {
            self.specials[SpecialCombo::TurboMaster.index()].count += 1;
            triggered.push(self.trigger(SpecialCombo::TurboMaster));
        }

        triggered
    }

    fn reached(&self, combo: SpecialCombo) -> bool {
        let progress = self.progress(combo);
        progress.count >= progress.threshold
    }

    fn slalom_dodges(&self, now_ms: f64) -> impl Iterator<Item = ObstacleKind> + '_ {
        self.history
            .within(now_ms, SLALOM_WINDOW_MS)
            .filter_map(|r| match r.action {
                ComboAction::Dodge { obstacle, .. } => Some(obstacle),
                _ => None,
            })
    }

    fn slalom_kinds(&self, now_ms: f64) -> usize {
        let mut kinds: Vec<ObstacleKind> = Vec::with_capacity(HISTORY_CAPACITY);
        for kind in self.slalom_dodges(now_ms) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds.len()
    }

    /// Recount the rules whose progress is a window over the history
    fn refresh_history_progress(&mut self, now_ms: f64) {
        let landings = self
            .history
            .within(now_ms, PERFECT_LANDING_WINDOW_MS)
            .filter(|r| matches!(r.action, ComboAction::JumpLand))
            .count() as u32;
        let dodges = self.slalom_dodges(now_ms).count() as u32;

        self.specials[SpecialCombo::PerfectLanding.index()].count = landings;
        self.specials[SpecialCombo::ObstacleSlalom.index()].count = dodges;
    }

    /// Award a special combo and reset only its own progress
    fn trigger(&mut self, combo: SpecialCombo) -> (SpecialCombo, u64) {
        let bonus = combo.bonus();
        self.score += bonus;
        self.specials[combo.index()].count = 0;
        log::info!("Special combo {} (+{})", combo.as_str(), bonus);
        (combo, bonus)
    }

    /// Time-driven decay; call once per tick
    pub fn advance_time(&mut self, now_ms: f64) {
        if self.streak > 0 && self.is_stale(now_ms) {
            log::debug!("Combo of {} timed out", self.streak);
            self.streak = 0;
            self.multiplier = 1.0;
        }

        let quiet = |last: Option<f64>, window_ms: f64| last.is_none_or(|t| now_ms - t >= window_ms);
        if quiet(self.last_fast_dodge_ms, SPEED_DEMON_WINDOW_MS) {
            self.specials[SpecialCombo::SpeedDemon.index()].count = 0;
        }
        if quiet(self.last_ramp_jump_ms, AIR_MASTER_WINDOW_MS) {
            self.specials[SpecialCombo::AirMaster.index()].count = 0;
        }

        self.refresh_history_progress(now_ms);
    }

    /// Drop the streak, history and every special counter; score is kept
    pub fn reset(&mut self) {
        self.streak = 0;
        self.multiplier = 1.0;
        self.last_action_ms = None;
        self.history.clear();
        self.specials = SpecialCombo::ALL.map(SpecialProgress::new);
        self.last_fast_dodge_ms = None;
        self.last_ramp_jump_ms = None;
    }

    pub fn snapshot(&self) -> ComboSnapshot {
        ComboSnapshot {
            streak: self.streak,
            multiplier: self.multiplier,
            score: self.score,
            last_action_ms: self.last_action_ms,
            recent: self.history.iter().copied().collect(),
            specials: self.specials.to_vec(),
        }
    }
}
