//! Ошибки runtime ядра herder'а
//!
//! Ошибки конфигурации живут в `config::ConfigError`.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HerderError {
    /// Нет spatial query backend'а на момент logic tick
    #[error("spatial query capability is unavailable")]
    MissingSpatialQuery,

    /// Нет physics integrator'а на момент fixed step
    #[error("physics integrator is unavailable")]
    MissingIntegrator,

    #[error("entity {0} has no Herder component")]
    NotAHerder(Entity),

    #[error("container {0} does not exist")]
    UnknownContainer(Entity),
}

impl HerderError {
    /// Фатальна ли ошибка для herder'а (→ active = false)
    pub fn disables_herder(&self) -> bool {
        matches!(
            self,
            HerderError::MissingSpatialQuery | HerderError::MissingIntegrator
        )
    }
}
