//! Moto Runner headless entry point
//!
//! Drives the simulation with the autopilot at a fixed 60 Hz frame delta and
//! prints the final snapshot as JSON. Useful for soak-testing tuning files:
//!
//! ```text
//! MOTO_RUNNER_TUNING=tuning.json RUST_LOG=info moto-runner [seed] [frames]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, name: &str, default: T) -> T {
    match args.get(index) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::error!("Invalid {} {:?}", name, raw);
                eprintln!("usage: moto-runner [seed] [frames]");
                std::process::exit(2);
            }
        },
        None => default,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use moto_runner::Tuning;
    use moto_runner::consts::FRAME_MS;
    use moto_runner::sim::{GamePhase, GameState, TickInput, tick};

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seed: u64 = parse_arg(&args, 1, "seed", 42);
    let frames: u64 = parse_arg(&args, 2, "frames", 60 * 60);

    log::info!("Moto Runner (headless) starting: seed {}, {} frames", seed, frames);

    let mut state = GameState::with_tuning(seed, Tuning::load());
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut runs = 0u32;
    let mut best = 0u64;
    for _ in 0..frames {
        if state.phase == GamePhase::GameOver {
            runs += 1;
            best = best.max(state.score());
            state.reset();
        }

        let events = tick(&mut state, &input, FRAME_MS);
        for (combo, bonus) in events.specials() {
            log::debug!("{:.0}ms: {} +{}", events.at_ms, combo.as_str(), bonus);
        }
    }
    best = best.max(state.score());

    log::info!("Finished {} crashed runs, best score {}", runs, best);

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds drive `sim::tick` from their own frame callback
}
