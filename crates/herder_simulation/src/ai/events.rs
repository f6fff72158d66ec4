//! AI Events: уведомления от herder систем
//!
//! HerderDisabled отправляется один раз, когда herder отключается из-за
//! отсутствующей capability (spatial query или integrator). Хост может
//! подписаться и показать диагностику / переподключить backend.

use bevy::prelude::*;

use crate::error::HerderError;

/// Herder отключён (active = false) из-за ошибки entry point'а
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HerderDisabled {
    /// Entity отключённого herder'а
    pub herder: Entity,
    /// Причина (какой capability не хватило)
    pub reason: HerderError,
}
