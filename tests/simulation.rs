//! End-to-end runs through the public tick pipeline

use moto_runner::Tuning;
use moto_runner::consts::*;
use moto_runner::sim::{
    ComboAction, ComboEngine, GameEvent, GamePhase, GameState, ObstacleKind, TickInput, tick,
};

fn demo() -> TickInput {
    TickInput {
        idle_mode: true,
        ..Default::default()
    }
}

/// Run the autopilot until the run ends or `frames` elapse
fn play(state: &mut GameState, frames: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend(tick(state, &demo(), FRAME_MS).events);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    events
}

#[test]
fn same_seed_same_run() {
    let mut a = GameState::new(0xB1CE);
    let mut b = GameState::new(0xB1CE);
    let events_a = play(&mut a, 3000);
    let events_b = play(&mut b, 3000);

    assert_eq!(events_a, events_b);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn event_points_add_up_to_score() {
    let mut state = GameState::new(8);
    let events = play(&mut state, 3000);

    let awarded: u64 = events.iter().map(GameEvent::points).sum();
    let floor = (state.distance / DISTANCE_PER_POINT).floor() as u64;
    assert!(state.score() >= awarded);
    assert!(state.score() >= floor);
}

#[test]
fn reset_starts_a_fresh_run() {
    let mut state = GameState::new(21);
    play(&mut state, 600);
    state.reset();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.phase, GamePhase::Ready);
    assert_eq!(snapshot.score, 0);
    assert_eq!(snapshot.distance, 0.0);
    assert_eq!(snapshot.difficulty, 1.0);
    assert!(snapshot.obstacles.is_empty());
    assert_eq!(snapshot.vehicle.speed, 0.0);
    assert_eq!(snapshot.combo.streak, 0);
}

#[test]
fn difficulty_climbs_with_distance() {
    let mut state = GameState::new(4);
    let throttle = TickInput {
        start: true,
        right: true,
        ..Default::default()
    };
    let mut steps = Vec::new();
    for _ in 0..1200 {
        let events = tick(&mut state, &throttle, FRAME_MS);
        steps.extend(events.iter().filter_map(|e| match e {
            GameEvent::DifficultyUp { difficulty } => Some(*difficulty),
            _ => None,
        }));
        // Clear the road so the run can't end
        state.track = moto_runner::sim::TrackGenerator::new(&state.tuning);
    }

    assert!(state.distance > 10_000.0);
    assert!(steps.len() >= 2);
    assert!(steps.windows(2).all(|w| w[1] > w[0]));
    assert!((steps[0] - 1.2).abs() < 1e-5);
}

#[test]
fn crash_reports_the_obstacle() {
    let mut state = GameState::new(1);
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, FRAME_MS);
    state.track.push(ObstacleKind::BigRock, VEHICLE_X);

    let events = tick(&mut state, &TickInput::default(), FRAME_MS);
    assert_eq!(
        events.iter().last(),
        Some(&GameEvent::Crash {
            kind: ObstacleKind::BigRock
        })
    );
    assert_eq!(state.phase, GamePhase::GameOver);
}

#[test]
fn custom_tuning_changes_top_speed() {
    let tuning = Tuning::from_json(r#"{ "max_speed": 8.0 }"#).unwrap();
    let mut state = GameState::with_tuning(2, tuning);
    let throttle = TickInput {
        start: true,
        right: true,
        ..Default::default()
    };
    for _ in 0..200 {
        tick(&mut state, &throttle, FRAME_MS);
        state.track = moto_runner::sim::TrackGenerator::new(&state.tuning);
    }
    assert!(state.vehicle.speed <= 8.0 + 0.3 + 1e-4);
    assert!(state.vehicle.speed > 7.0);
}

#[test]
fn combo_example_from_four_dodges() {
    let mut engine = ComboEngine::new();
    for i in 0..4 {
        let action = ComboAction::Dodge {
            obstacle: ObstacleKind::Rock,
            speed: 5.0,
        };
        engine.add_action(action, 20, i as f64 * 200.0);
    }
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.streak, 4);
    assert_eq!(snapshot.multiplier, 2.5);
    assert_eq!(snapshot.score, 140);
    assert_eq!(snapshot.recent.len(), 4);
}
