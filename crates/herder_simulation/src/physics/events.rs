//! Contact события от physics integrator'а

use bevy::prelude::*;

use crate::spatial::Category;

/// Herder коснулся сущности категории `category`
///
/// Отправляет integrator (engine bridge или тест). Boundary/Obstacle →
/// bounce, остальные категории игнорируются.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub herder: Entity,
    pub category: Category,
}
