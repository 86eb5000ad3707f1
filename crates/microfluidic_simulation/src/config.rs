//! Конфигурация симуляции (flat struct, собирается один раз при старте)
//!
//! Заменяет панель слайдеров: размеры камеры, темп роста, стартовая популяция.
//! Единицы: микрометры, секунды.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SimulationError, SimulationResult};

/// Initial half-length капсулы = radius × ratio (палочка ~2:1 при рождении)
pub const INITIAL_HALF_LENGTH_RATIO: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ширина камеры (µm), ось X
    pub chamber_width: f32,
    /// Высота камеры (µm), ось Y
    pub chamber_height: f32,
    /// Множитель half-length за тик (1.001 ≈ непрерывный экспоненциальный рост)
    pub growth_rate: f32,
    /// Сколько бактерий спавнить в `init_simulation`
    pub initial_count: usize,
    /// Радиус капсулы (µm)
    pub bacterium_radius: f32,
    /// σ Gaussian-распределения стартовой скорости (µm/s)
    pub velocity_std_dev: f32,
    /// Fixed physics step (sec)
    pub timestep: f32,
    pub seed: u64,
    pub start_paused: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            chamber_width: 100.0,
            chamber_height: 60.0,
            growth_rate: 1.001,
            initial_count: 12,
            bacterium_radius: 0.5,
            velocity_std_dev: 1.0,
            timestep: 1.0 / 60.0,
            seed: 42,
            start_paused: false,
        }
    }
}

impl SimulationConfig {
    /// Half-length новорождённой бактерии для данного радиуса
    pub fn initial_half_length(radius: f32) -> f32 {
        radius * INITIAL_HALF_LENGTH_RATIO
    }

    pub fn validate(&self) -> SimulationResult<()> {
        check_positive("chamber_width", self.chamber_width)?;
        check_positive("chamber_height", self.chamber_height)?;
        check_positive("bacterium_radius", self.bacterium_radius)?;
        check_positive("timestep", self.timestep)?;

        // growth_rate > 1 гарантирует строгий рост length
        if !self.growth_rate.is_finite() || self.growth_rate <= 1.0 {
            return Err(SimulationError::invalid(format!(
                "growth_rate must be finite and > 1.0, got {}",
                self.growth_rate
            )));
        }

        if !self.velocity_std_dev.is_finite() || self.velocity_std_dev < 0.0 {
            return Err(SimulationError::invalid(format!(
                "velocity_std_dev must be finite and >= 0, got {}",
                self.velocity_std_dev
            )));
        }

        // Стартовая бактерия должна помещаться в камеру целиком
        let extent = 2.0 * (Self::initial_half_length(self.bacterium_radius) + self.bacterium_radius);
        if extent >= self.chamber_width.min(self.chamber_height) {
            return Err(SimulationError::invalid(format!(
                "bacterium extent {} does not fit into {}x{} chamber",
                extent, self.chamber_width, self.chamber_height
            )));
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> SimulationResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::invalid(format!("config parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::invalid(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Config из первого CLI аргумента (если есть), иначе defaults
    pub fn from_args() -> SimulationResult<Self> {
        match std::env::args().nth(1) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn check_positive(name: &str, value: f32) -> SimulationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )))
    }
}
