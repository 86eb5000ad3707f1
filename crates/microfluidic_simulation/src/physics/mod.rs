//! Physics seam
//!
//! Registry не знает про внутренности engine: только узкий интерфейс
//! `PhysicsWorld` (create / resize / velocity / translation / remove / step).
//! Реализация по умолчанию — Rapier 2D (`RapierWorld`).

use bevy::math::Vec2;
use thiserror::Error;

pub mod rapier_world;

pub use rapier_world::{RapierHandle, RapierWorld};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("rigid body is missing (already removed?)")]
    MissingBody,
    #[error("collider is missing (already removed?)")]
    MissingCollider,
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Внешний 2D physics world (rigid bodies + capsule colliders)
///
/// Один handle = одно dynamic тело + один capsule collider (ось капсулы — локальная Y).
/// Удаление: сначала collider, потом body (collider не должен пережить тело).
pub trait PhysicsWorld {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Пустой мир без гравитации с fixed step `timestep`
    fn new(timestep: f32) -> Self
    where
        Self: Sized;

    fn create_capsule_body(
        &mut self,
        position: Vec2,
        rotation: f32,
        half_length: f32,
        radius: f32,
    ) -> Self::Handle;

    fn resize_capsule(&mut self, handle: Self::Handle, half_length: f32, radius: f32) -> PhysicsResult<()>;

    fn linear_velocity(&self, handle: Self::Handle) -> PhysicsResult<Vec2>;

    fn set_linear_velocity(&mut self, handle: Self::Handle, velocity: Vec2) -> PhysicsResult<()>;

    fn translation(&self, handle: Self::Handle) -> PhysicsResult<Vec2>;

    fn set_translation(&mut self, handle: Self::Handle, position: Vec2) -> PhysicsResult<()>;

    /// Угол поворота (radians, CCW)
    fn rotation(&self, handle: Self::Handle) -> PhysicsResult<f32>;

    fn remove_collider(&mut self, handle: Self::Handle) -> PhysicsResult<()>;

    fn remove_body(&mut self, handle: Self::Handle) -> PhysicsResult<()>;

    /// Продвинуть мир на один fixed step
    fn step(&mut self);

    /// Количество живых тел (для проверки инварианта registry ↔ engine)
    fn body_count(&self) -> usize;
}
