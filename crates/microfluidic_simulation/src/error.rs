//! Ошибки registry
//!
//! - NotInitialized / InvalidParameter — возвращаются caller'у
//! - EngineOperationFailed — при eviction/teardown логируются per-entry

use thiserror::Error;

use crate::physics::PhysicsError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Операция до `init_simulation` или после `teardown`
    #[error("simulation is not initialized")]
    NotInitialized,

    /// Non-finite / out-of-range позиция, размер или параметр конфига
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Сам вызов physics engine провалился (например, повторное удаление handle)
    #[error("physics engine operation failed: {0}")]
    EngineOperationFailed(#[from] PhysicsError),
}

impl SimulationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
