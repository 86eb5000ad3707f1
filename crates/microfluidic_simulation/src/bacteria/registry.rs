//! BacteriumRegistry — единственный источник истины о живых бактериях
//!
//! Владеет physics world (единственный владелец, конкурентного доступа нет).
//!
//! Порядок внутри кадра (задаёт caller / SimulationPlugin):
//! 1. enforce_boundaries — eviction вышедших за камеру
//! 2. tick — рост + velocity reset + physics step
//! 3. snapshot — чтение для рендера
//!
//! Политика: delete-on-exit (не wrap), velocity обнуляется ПОСЛЕ роста и ДО step.

use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::logger;
use crate::physics::{PhysicsWorld, RapierWorld};

use super::components::{
    chamber_contains, max_half_length, BacteriumEntry, BacteriumId, Lifecycle, TickStatus,
};
use super::snapshot::Snapshot;
use super::velocity::sample_gaussian_velocity;

pub struct BacteriumRegistry<P: PhysicsWorld = RapierWorld> {
    /// None → uninitialized или destroyed
    world: Option<P>,
    /// BTreeMap: детерминированный порядок обхода
    entries: BTreeMap<BacteriumId, BacteriumEntry<P::Handle>>,
    next_id: u64,
    paused: bool,
    lifecycle: Lifecycle,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    tick_count: u64,
}

impl<P: PhysicsWorld> Default for BacteriumRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhysicsWorld> BacteriumRegistry<P> {
    /// Пустой registry в состоянии Uninitialized
    pub fn new() -> Self {
        let config = SimulationConfig::default();
        Self {
            world: None,
            entries: BTreeMap::new(),
            next_id: 0,
            paused: false,
            lifecycle: Lifecycle::Uninitialized,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            tick_count: 0,
        }
    }

    /// `new()` + `init_simulation(config)`
    pub fn initialized(config: SimulationConfig) -> SimulationResult<Self> {
        let mut registry = Self::new();
        registry.init_simulation(config)?;
        Ok(registry)
    }

    /// Создаёт physics world и стартовую популяцию
    ///
    /// На живой симуляции работает как reset (teardown + init).
    /// Невалидный config не трогает текущее состояние.
    pub fn init_simulation(&mut self, config: SimulationConfig) -> SimulationResult<()> {
        config.validate()?;

        if self.world.is_some() {
            logger::log_info("Restarting simulation (teardown before init)");
            self.teardown();
        }

        self.rng = ChaCha8Rng::seed_from_u64(config.seed);
        self.world = Some(P::new(config.timestep));
        self.entries.clear();
        self.next_id = 0;
        self.tick_count = 0;
        self.paused = config.start_paused;
        self.lifecycle = Lifecycle::Running;
        self.config = config;

        for _ in 0..self.config.initial_count {
            let position = self.random_spawn_position();
            self.spawn(position, self.config.bacterium_radius)?;
        }

        logger::log_info(&format!(
            "Simulation initialized: chamber {}x{} µm, {} bacteria, growth ×{}/tick, seed {}",
            self.config.chamber_width,
            self.config.chamber_height,
            self.entries.len(),
            self.config.growth_rate,
            self.config.seed
        ));

        Ok(())
    }

    /// Спавн capsule-бактерии в `position`
    ///
    /// Half-length = `initial_radius × INITIAL_HALF_LENGTH_RATIO`,
    /// скорость — Gaussian с σ = `config.velocity_std_dev`.
    pub fn spawn(&mut self, position: Vec2, initial_radius: f32) -> SimulationResult<BacteriumId> {
        if self.world.is_none() {
            return Err(SimulationError::NotInitialized);
        }

        if !position.is_finite() {
            return Err(SimulationError::invalid(format!(
                "spawn position must be finite, got {:?}",
                position
            )));
        }
        if !chamber_contains(self.config.chamber_width, self.config.chamber_height, position) {
            return Err(SimulationError::invalid(format!(
                "spawn position {:?} is outside the {}x{} chamber",
                position, self.config.chamber_width, self.config.chamber_height
            )));
        }
        if !initial_radius.is_finite() || initial_radius <= 0.0 {
            return Err(SimulationError::invalid(format!(
                "initial radius must be finite and > 0, got {}",
                initial_radius
            )));
        }

        let half_length = SimulationConfig::initial_half_length(initial_radius);
        let rotation = self.rng.gen_range(0.0..TAU);
        let velocity = sample_gaussian_velocity(&mut self.rng, self.config.velocity_std_dev);

        let world = self.world.as_mut().ok_or(SimulationError::NotInitialized)?;
        let handle = world.create_capsule_body(position, rotation, half_length, initial_radius);

        if let Err(e) = world.set_linear_velocity(handle, velocity) {
            // Свежий handle без entry — откатываем, чтобы не нарушить 1:1
            release_handle(world, None, handle);
            return Err(e.into());
        }

        let id = BacteriumId(self.next_id);
        self.next_id += 1;

        self.entries.insert(
            id,
            BacteriumEntry {
                id,
                handle,
                length: half_length,
                radius: initial_radius,
            },
        );

        logger::log(&format!(
            "Spawned bacterium {} at ({:.2}, {:.2}), v=({:.2}, {:.2})",
            id, position.x, position.y, velocity.x, velocity.y
        ));

        Ok(id)
    }

    /// Рост всех бактерий + один physics step
    ///
    /// Порядок обхода не влияет на результат: update per-entry локальный.
    pub fn tick(&mut self) -> TickStatus {
        let Some(world) = self.world.as_mut() else {
            return TickStatus::Uninitialized;
        };
        if self.paused {
            return TickStatus::Paused;
        }

        let growth_rate = self.config.growth_rate;
        // Рост упирается в диагональ камеры, length всегда конечна
        let max_length = max_half_length(self.config.chamber_width, self.config.chamber_height);

        for entry in self.entries.values_mut() {
            entry.length = (entry.length * growth_rate).min(max_length);

            if let Err(e) = world.resize_capsule(entry.handle, entry.length, entry.radius) {
                logger::log_error(&format!("Failed to resize bacterium {}: {}", entry.id, e));
            }

            // Рост не должен придавать импульс
            if let Err(e) = world.set_linear_velocity(entry.handle, Vec2::ZERO) {
                logger::log_error(&format!(
                    "Failed to reset velocity of bacterium {}: {}",
                    entry.id, e
                ));
            }
        }

        world.step();
        self.tick_count += 1;

        TickStatus::Advanced
    }

    /// Удаляет бактерии с центром вне `[0,width]×[0,height]`
    ///
    /// Переросшие (half-length дошла до диагонали камеры) тоже удаляются.
    /// Возвращает удалённые id (по возрастанию). Ошибки engine логируются
    /// per-entry, entry удаляется в любом случае.
    pub fn enforce_boundaries(&mut self, width: f32, height: f32) -> Vec<BacteriumId> {
        let Some(world) = self.world.as_mut() else {
            return Vec::new();
        };

        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            logger::log_warning(&format!(
                "enforce_boundaries ignored: invalid chamber {}x{}",
                width, height
            ));
            return Vec::new();
        }

        let max_length = max_half_length(width, height);

        let outside: Vec<BacteriumId> = self
            .entries
            .values()
            .filter(|entry| {
                if !entry.length.is_finite() || entry.length >= max_length {
                    logger::log_warning(&format!(
                        "Bacterium {} outgrew the chamber (half-length {}), evicting",
                        entry.id, entry.length
                    ));
                    return true;
                }
                match world.translation(entry.handle) {
                    Ok(position) => !chamber_contains(width, height, position),
                    Err(e) => {
                        // Handle уже мёртв — entry тоже должна уйти
                        logger::log_warning(&format!(
                            "Bacterium {} has no readable body ({}), evicting",
                            entry.id, e
                        ));
                        true
                    }
                }
            })
            .map(|entry| entry.id)
            .collect();

        for id in &outside {
            if let Some(entry) = self.entries.remove(id) {
                release_handle(world, Some(entry.id), entry.handle);
            }
        }

        if !outside.is_empty() {
            logger::log(&format!(
                "Evicted {} bacteria outside chamber: {:?}",
                outside.len(),
                outside
            ));
        }

        outside
    }

    /// Переместить тело бактерии через её physics handle
    pub fn teleport(&mut self, id: BacteriumId, position: Vec2) -> SimulationResult<()> {
        let world = self.world.as_mut().ok_or(SimulationError::NotInitialized)?;

        if !position.is_finite() {
            return Err(SimulationError::invalid(format!(
                "teleport position must be finite, got {:?}",
                position
            )));
        }

        let entry = self
            .entries
            .get(&id)
            .ok_or_else(|| SimulationError::invalid(format!("unknown bacterium {}", id)))?;

        world.set_translation(entry.handle, position)?;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Возвращает новое значение paused
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Удаляет все collider'ы, затем все тела, освобождает world
    ///
    /// Идемпотентно: повторный вызов только логирует.
    pub fn teardown(&mut self) {
        let Some(mut world) = self.world.take() else {
            logger::log_warning("teardown ignored: simulation is not initialized");
            return;
        };

        // Сначала все collider'ы, потом все тела
        for entry in self.entries.values() {
            if let Err(e) = world.remove_collider(entry.handle) {
                logger::log_error(&format!(
                    "teardown: failed to remove collider of bacterium {}: {}",
                    entry.id, e
                ));
            }
        }
        for entry in self.entries.values() {
            if let Err(e) = world.remove_body(entry.handle) {
                logger::log_error(&format!(
                    "teardown: failed to remove body of bacterium {}: {}",
                    entry.id, e
                ));
            }
        }

        let removed = self.entries.len();
        self.entries.clear();
        drop(world);

        self.next_id = 0;
        self.paused = false;
        self.lifecycle = Lifecycle::Destroyed;

        logger::log_info(&format!(
            "Simulation torn down after {} ticks ({} bacteria removed)",
            self.tick_count, removed
        ));
    }

    /// Read-only view для render layer (пустой если uninitialized)
    pub fn snapshot(&self) -> Snapshot<'_, P> {
        Snapshot::new(self)
    }

    pub fn population(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: BacteriumId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        self.world.is_some()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn handle(&self, id: BacteriumId) -> Option<P::Handle> {
        self.entries.get(&id).map(|entry| entry.handle)
    }

    /// Read-only доступ к physics world (мутации — только через registry)
    pub fn world(&self) -> Option<&P> {
        self.world.as_ref()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<BacteriumId, BacteriumEntry<P::Handle>> {
        &self.entries
    }

    /// Случайная точка, где стартовая капсула целиком внутри камеры
    fn random_spawn_position(&mut self) -> Vec2 {
        let radius = self.config.bacterium_radius;
        let margin = SimulationConfig::initial_half_length(radius) + radius;

        let x = self
            .rng
            .gen_range(margin..=self.config.chamber_width - margin);
        let y = self
            .rng
            .gen_range(margin..=self.config.chamber_height - margin);

        Vec2::new(x, y)
    }
}

/// Удаляет handle (collider → body), ошибки только логируются
fn release_handle<P: PhysicsWorld>(world: &mut P, id: Option<BacteriumId>, handle: P::Handle) {
    let label = id.map_or_else(|| format!("{:?}", handle), |id| id.to_string());

    if let Err(e) = world.remove_collider(handle) {
        logger::log_error(&format!("Failed to remove collider of {}: {}", label, e));
    }
    if let Err(e) = world.remove_body(handle) {
        logger::log_error(&format!("Failed to remove body of {}: {}", label, e));
    }
}
