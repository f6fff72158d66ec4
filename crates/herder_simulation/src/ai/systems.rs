//! Herder decision system (perception → FSM → steering, раз в frame)

use bevy::prelude::*;

use super::events::HerderDisabled;
use crate::components::{world_transform, Herder, SafeZone, WorldPoses};
use crate::spatial::SpatialQuery;
use crate::DeterministicRng;

/// Система: logic tick для всех herder'ов
///
/// Spatial backend: любой `Resource`, реализующий `SpatialQuery`
/// (headless: `ArenaIndex`). Если ресурса нет, каждый активный herder
/// отключается и отправляется `HerderDisabled`.
///
/// Safe zone: берём первую по Entity (детерминированно).
///
/// Transform herder'а внутри container'а локальный: perception и steering
/// получают world pose (container ∘ local).
pub fn herder_decision<S: SpatialQuery + Resource>(
    mut herders: Query<(Entity, &mut Herder, &Transform, Option<&ChildOf>)>,
    safe_zones: Query<Entity, With<SafeZone>>,
    poses: WorldPoses,
    spatial: Option<Res<S>>,
    mut rng: ResMut<DeterministicRng>,
    mut disabled: EventWriter<HerderDisabled>,
) {
    let safe_zone = safe_zones
        .iter()
        .min()
        .map(|entity| world_transform(entity, &poses).translation);
    let spatial = spatial.as_deref().map(|s| s as &dyn SpatialQuery);
    let rng = &mut rng.rng;

    for (entity, mut herder, local, container) in herders.iter_mut() {
        let previous = herder.state();
        let pose = match container {
            Some(container) => world_transform(container.parent(), &poses).mul_transform(*local),
            None => *local,
        };

        if let Err(reason) = herder.logic_tick(&pose, spatial, safe_zone, rng) {
            crate::log_error(&format!(
                "{} ({:?}) disabled: {}",
                herder.label(),
                entity,
                reason
            ));
            if reason.disables_herder() {
                disabled.write(HerderDisabled {
                    herder: entity,
                    reason,
                });
            }
            continue;
        }

        if herder.state() != previous {
            crate::log(&format!(
                "{}: {} → {} (target {:?})",
                herder.label(),
                previous.as_str(),
                herder.state().as_str(),
                herder.target()
            ));
        }
    }
}
