//! Simulation tick
//!
//! One call advances a run by one frame. The pipeline order is fixed:
//! vehicle physics, track generation and scrolling, collisions, then combo
//! scoring and combo decay.

use super::autopilot;
use super::collision::{self, Contact};
use super::combo::{ActionOutcome, ComboAction};
use super::events::{FrameEvents, GameEvent};
use super::state::{GamePhase, GameState, difficulty_for_distance};
use super::track::SpawnContext;
use super::vehicle::DriveControls;
use crate::consts::*;

/// Control snapshot for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Brake
    pub left: bool,
    /// Throttle
    pub right: bool,
    /// Jump pressed
    pub jump: bool,
    /// Crouch held
    pub crouch: bool,
    /// Turbo held
    pub turbo: bool,
    /// Leave the ready screen
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - the autopilot drives
    pub idle_mode: bool,
}

impl TickInput {
    fn drive(&self) -> DriveControls {
        DriveControls {
            accelerate: self.right,
            brake: self.left,
        }
    }
}

/// Advance the run by one frame of `delta_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f64) -> FrameEvents {
    let mut events = FrameEvents::new(state.time_ms);

    let input = if input.idle_mode {
        TickInput {
            pause: input.pause,
            idle_mode: true,
            ..autopilot::drive(state)
        }
    } else {
        input.clone()
    };

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if state.phase == GamePhase::Ready && input.start {
        state.phase = GamePhase::Playing;
        events.push(GameEvent::Started);
        log::info!("Run started (seed {})", state.seed);
    }

    // Paused and game-over runs don't accumulate time
    if state.phase != GamePhase::Playing {
        return events;
    }

    state.time_ms += delta_ms.clamp(0.0, MAX_FRAME_MS);
    state.time_ticks += 1;
    let now = state.time_ms;
    events.at_ms = now;

    let mut actions = Vec::new();

    // Controls
    if input.jump {
        state.vehicle.jump(&state.tuning);
    }
    if input.crouch {
        state.vehicle.crouch();
    } else {
        state.vehicle.stand();
    }
    if input.turbo {
        state.vehicle.activate_turbo(now);
    } else if let Some(mastered) = state.vehicle.deactivate_turbo(now) {
        actions.push(ComboAction::TurboMaster {
            duration_ms: mastered.duration_ms,
            speed: mastered.speed,
        });
    }

    // Vehicle
    let step = state.vehicle.update(&state.tuning, input.drive());
    if step.landed {
        actions.push(ComboAction::JumpLand);
    }
    state.distance += step.distance;

    let difficulty = difficulty_for_distance(state.distance);
    if difficulty > state.difficulty {
        state.difficulty = difficulty;
        events.push(GameEvent::DifficultyUp { difficulty });
        log::info!("Difficulty {:.1} at {:.0}px", difficulty, state.distance);
    }

    // Track
    let ctx = SpawnContext {
        now_ms: now,
        speed: state.vehicle.speed,
        difficulty: state.difficulty,
    };
    state.track.generate(&ctx, &mut state.rng);
    for dodge in state.track.update(state.vehicle.speed, state.vehicle.pos.x) {
        actions.push(ComboAction::Dodge {
            obstacle: dodge.kind,
            speed: dodge.speed,
        });
    }

    // Collisions
    let mut crashed_into = None;
    for hit in collision::resolve(&state.vehicle, state.track.obstacles()) {
        match hit.contact {
            Contact::RampJump => {
                state.track.mark_launched(hit.obstacle_id);
                if state.vehicle.launch_from_ramp(&state.tuning) {
                    actions.push(ComboAction::RampJump);
                }
            }
            Contact::Crash => crashed_into = Some(hit.kind),
            Contact::None => {}
        }
    }

    // Scoring
    for action in actions {
        let outcome = state.combo.add_action(action, action.base_points(), now);
        push_scored(&mut events, action, outcome);
    }

    if let Some(kind) = crashed_into {
        state.phase = GamePhase::GameOver;
        state.combo.reset();
        events.push(GameEvent::Crash { kind });
        log::info!(
            "Crashed into {} at {:.0}px, score {}",
            kind.as_str(),
            state.distance,
            state.score()
        );
    }

    state
        .combo
        .raise_score_floor((state.distance / DISTANCE_PER_POINT).floor() as u64);
    state.combo.advance_time(now);

    events
}

/// Emit the event for a scored action followed by any specials it triggered
fn push_scored(events: &mut FrameEvents, action: ComboAction, outcome: ActionOutcome) {
    let points = outcome.points;
    events.push(match action {
        ComboAction::JumpLand => GameEvent::Landed { points },
        ComboAction::Dodge { obstacle, speed } => GameEvent::Dodged {
            kind: obstacle,
            speed,
            points,
        },
        ComboAction::RampJump => GameEvent::RampJump { points },
        ComboAction::TurboMaster { duration_ms, speed } => GameEvent::TurboMastered {
            duration_ms,
            speed,
            points,
        },
    });
    for (combo, bonus) in outcome.specials {
        events.push(GameEvent::SpecialCombo { combo, bonus });
    }
}
