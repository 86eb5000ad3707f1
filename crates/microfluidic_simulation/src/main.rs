//! Headless симуляция камеры
//!
//! Запускает Bevy App без рендера: `microfluidic_simulation [config.json]`

use microfluidic_simulation::{create_headless_app, logger, run_fixed_tick, Simulation, SimulationConfig};

const TICKS: u64 = 3600; // 1 минута при 60Hz

fn main() {
    logger::init_logger();

    let config = match SimulationConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            logger::log_error(&format!("Config error: {}", e));
            std::process::exit(1);
        }
    };

    logger::log_info(&format!(
        "Starting headless microfluidic simulation (seed: {})",
        config.seed
    ));

    let mut app = create_headless_app(config);

    for tick in 0..TICKS {
        run_fixed_tick(&mut app);

        if tick % 600 == 0 {
            let simulation = app.world().resource::<Simulation>();
            let mean_length = {
                let snapshot = simulation.snapshot();
                let total: f32 = snapshot.iter().map(|(_, state)| state.length).sum();
                if snapshot.is_empty() {
                    0.0
                } else {
                    total / snapshot.len() as f32
                }
            };
            logger::log_info(&format!(
                "Tick {}: {} bacteria, mean half-length {:.3} µm",
                tick,
                simulation.population(),
                mean_length
            ));
        }
    }

    logger::log_info("Simulation complete!");
}
