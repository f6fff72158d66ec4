//! Herder AI module
//!
//! Perception (выбор цели) → FSM (classify по дистанции) → steering.
//! Всё выполняется раз в frame (Update), locomotion отдельно в FixedUpdate
//! (см. `physics`).

use bevy::prelude::*;

pub mod events;
pub mod fsm;
pub mod perception;
pub mod steering;
pub mod systems;
pub mod wander;


// Re-export основных типов
pub use events::HerderDisabled;
pub use fsm::{classify, HerderState};
pub use perception::{select_target, SelectedTarget};
pub use steering::{steer, SteeringContext, SteeringOutput};
pub use systems::herder_decision;
pub use wander::wander;

use crate::spatial::ArenaIndex;

/// AI Plugin
///
/// Регистрирует `HerderDisabled` и decision систему (Update, после
/// пересборки spatial index'а).
pub struct HerderAIPlugin;

impl Plugin for HerderAIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HerderDisabled>().add_systems(
            Update,
            herder_decision::<ArenaIndex>.in_set(crate::SimulationSet::Decision),
        );
    }
}
