//! Microfluidic Simulation Core
//!
//! Бактерии-капсулы растут и двигаются внутри микрофлюидной камеры.
//!
//! Разделение ответственности:
//! - Registry (этот crate) = какие бактерии живы, их рост, eviction, teardown
//! - Rapier 2D = collision detection + интеграция (за trait `PhysicsWorld`)
//! - Client (Bevy) = рендер, камера, управление

use bevy::prelude::*;

pub mod bacteria;
pub mod config;
pub mod error;
pub mod logger;
pub mod physics;

pub use bacteria::{
    chamber_contains, BacteriaEvicted, BacteriumId, BacteriumRegistry, BacteriumState, Lifecycle,
    Simulation, SimulationCommand, Snapshot, TickStatus,
};
pub use config::{SimulationConfig, INITIAL_HALF_LENGTH_RATIO};
pub use error::{SimulationError, SimulationResult};
pub use logger::*;
pub use physics::{PhysicsError, PhysicsWorld, RapierHandle, RapierWorld};

/// Главный plugin симуляции
///
/// Registry инициализируется прямо в `build`, чтобы первый FixedUpdate
/// уже видел живую камеру (без отдельного Startup-прохода).
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let mut registry = BacteriumRegistry::<RapierWorld>::new();
        if let Err(e) = registry.init_simulation(self.config.clone()) {
            // Остаёмся uninitialized: тики no-op, Start с валидным config оживит
            logger::log_error(&format!("Simulation init failed: {}", e));
        }

        // Time<Fixed> паникует на нулевом шаге — невалидный timestep → default
        let timestep = if self.config.timestep.is_finite() && self.config.timestep > 0.0 {
            self.config.timestep
        } else {
            SimulationConfig::default().timestep
        };

        app.insert_resource(Time::<Fixed>::from_seconds(timestep as f64))
            .insert_resource(Simulation(registry))
            .add_event::<SimulationCommand>()
            .add_event::<BacteriaEvicted>()
            .add_systems(
                FixedUpdate,
                (
                    bacteria::apply_simulation_commands,
                    bacteria::enforce_chamber_boundaries,
                    bacteria::advance_growth,
                )
                    .chain(), // boundaries → growth/step → (Update) render
            );
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(config: SimulationConfig) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(config));

    app
}

/// Один fixed tick без привязки к wall-clock (тесты, headless runner)
pub fn run_fixed_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}
