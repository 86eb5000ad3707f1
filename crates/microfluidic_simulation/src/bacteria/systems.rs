//! Bevy-системы симуляции (FixedUpdate)
//!
//! Порядок (chain):
//! 1. apply_simulation_commands — start/pause/reset/spawn из UI
//! 2. enforce_chamber_boundaries — eviction → BacteriaEvicted
//! 3. advance_growth — рост + physics step
//!
//! Render sync читает `Simulation` в Update, т.е. уже после step.

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::logger;
use crate::physics::RapierWorld;

use super::components::{BacteriumId, TickStatus};
use super::registry::BacteriumRegistry;

/// Registry как Bevy resource (единственный владелец physics world)
#[derive(Resource, Deref, DerefMut, Default)]
pub struct Simulation(pub BacteriumRegistry<RapierWorld>);

/// Команды control panel → симуляция
#[derive(Event, Debug, Clone)]
pub enum SimulationCommand {
    /// Новый run с другим config (reset + init)
    Start(SimulationConfig),
    /// Перезапуск с текущим config
    Reset,
    Pause,
    Resume,
    TogglePause,
    Spawn { position: Vec2 },
    Teardown,
}

/// Бактерии, удалённые за выход из камеры на этом тике
#[derive(Event, Debug, Clone)]
pub struct BacteriaEvicted {
    pub ids: Vec<BacteriumId>,
    pub tick: u64,
}

pub fn apply_simulation_commands(
    mut commands: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut fixed_time: ResMut<Time<Fixed>>,
) {
    for command in commands.read() {
        match command {
            SimulationCommand::Start(config) => match simulation.init_simulation(config.clone()) {
                // Частота FixedUpdate следует dt physics world
                Ok(()) => fixed_time.set_timestep_seconds(f64::from(config.timestep)),
                Err(e) => logger::log_error(&format!("Start rejected: {}", e)),
            },
            SimulationCommand::Reset => {
                let config = simulation.config().clone();
                if let Err(e) = simulation.init_simulation(config) {
                    logger::log_error(&format!("Reset failed: {}", e));
                }
            }
            SimulationCommand::Pause => simulation.pause(),
            SimulationCommand::Resume => simulation.resume(),
            SimulationCommand::TogglePause => {
                let paused = simulation.toggle_pause();
                logger::log_info(if paused { "Simulation paused" } else { "Simulation resumed" });
            }
            SimulationCommand::Spawn { position } => {
                let radius = simulation.config().bacterium_radius;
                match simulation.spawn(*position, radius) {
                    Ok(id) => logger::log_info(&format!("Spawned bacterium {} on request", id)),
                    Err(e) => logger::log_warning(&format!("Spawn rejected: {}", e)),
                }
            }
            SimulationCommand::Teardown => simulation.teardown(),
        }
    }
}

pub fn enforce_chamber_boundaries(
    mut simulation: ResMut<Simulation>,
    mut evicted: EventWriter<BacteriaEvicted>,
) {
    let (width, height) = {
        let config = simulation.config();
        (config.chamber_width, config.chamber_height)
    };

    let ids = simulation.enforce_boundaries(width, height);
    if !ids.is_empty() {
        evicted.write(BacteriaEvicted {
            ids,
            tick: simulation.tick_count(),
        });
    }
}

pub fn advance_growth(mut simulation: ResMut<Simulation>) {
    if simulation.tick() == TickStatus::Advanced && simulation.tick_count() % 600 == 0 {
        logger::log_info(&format!(
            "Tick {}: {} bacteria",
            simulation.tick_count(),
            simulation.population()
        ));
    }
}
