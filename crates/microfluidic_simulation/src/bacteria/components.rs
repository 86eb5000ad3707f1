//! Данные бактерии: id, entry в registry, read-only state для рендера

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable ID бактерии (монотонный, не переиспользуется внутри одного run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BacteriumId(pub u64);

impl fmt::Display for BacteriumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Запись registry: physics handle + growth метаданные
///
/// Инвариант: entry существует ⇔ handle жив в physics world
#[derive(Debug, Clone, Copy)]
pub struct BacteriumEntry<H> {
    pub id: BacteriumId,
    pub handle: H,
    /// Half-length капсулы (µm), строго растёт пока бактерия жива
    pub length: f32,
    /// Радиус капсулы (µm), фиксирован при spawn
    pub radius: f32,
}

/// Проекция одной бактерии для render layer (читается заново каждый кадр)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacteriumState {
    pub position: Vec2,
    /// Radians, CCW; ось капсулы — локальная Y
    pub rotation: f32,
    pub length: f32,
    pub radius: f32,
}

impl BacteriumState {
    /// Полная длина палочки от кончика до кончика
    pub fn total_length(&self) -> f32 {
        2.0 * (self.length + self.radius)
    }
}

/// Результат `tick()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Advanced,
    Paused,
    Uninitialized,
}

/// uninitialized → running → destroyed (re-entry только через init_simulation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Running,
    Destroyed,
}

/// Центр тела внутри `[0,width]×[0,height]` (границы включительно, NaN — снаружи)
pub fn chamber_contains(width: f32, height: f32, position: Vec2) -> bool {
    position.is_finite()
        && position.x >= 0.0
        && position.x <= width
        && position.y >= 0.0
        && position.y <= height
}

/// Предел half-length: капсула длиннее диагонали камеры в ней уже не помещается
pub fn max_half_length(width: f32, height: f32) -> f32 {
    width.hypot(height)
}
