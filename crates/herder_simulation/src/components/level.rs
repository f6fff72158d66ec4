//! Level: container context для herder'ов
//!
//! Container передаётся явно в `initialize_herder` (никакого глобального
//! `Level::instance`). Если container не указан: herder привязывается к
//! level'у по умолчанию, который создаётся один раз и потом переиспользуется.

use bevy::prelude::*;

use super::herder::Herder;
use crate::error::HerderError;

/// Максимальная глубина цепочки container'ов (защита от циклов)
const MAX_CONTAINER_DEPTH: usize = 32;

/// Poses не-herder entity (container'ы, prey, safe zone) для композиции world pose
pub type WorldPoses<'w, 's> =
    Query<'w, 's, (&'static Transform, Option<&'static ChildOf>), Without<Herder>>;

/// World transform entity: композиция Transform'ов вверх по ChildOf
///
/// Под `MinimalPlugins` нет transform propagation, поэтому `GlobalTransform`
/// не используется. Неизвестная entity → identity.
pub fn world_transform(entity: Entity, poses: &WorldPoses) -> Transform {
    let mut world = Transform::IDENTITY;
    let mut current = Some(entity);

    for _ in 0..MAX_CONTAINER_DEPTH {
        let Some(entity) = current else {
            break;
        };
        let Ok((transform, parent)) = poses.get(entity) else {
            break;
        };
        world = transform.mul_transform(world);
        current = parent.map(|p| p.parent());
    }

    world
}

/// Маркер container entity (level арены)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Level;

/// Level по умолчанию (создаётся по требованию)
#[derive(Resource, Debug, Clone, Copy)]
pub struct DefaultLevel(pub Entity);

/// Возвращает level по умолчанию, создавая его при первом обращении
pub fn default_level(world: &mut World) -> Entity {
    if let Some(level) = world.get_resource::<DefaultLevel>().map(|level| level.0) {
        if world.entities().contains(level) {
            return level;
        }
    }

    let level = world.spawn(Level).id();
    world.insert_resource(DefaultLevel(level));
    crate::log(&format!("Level: created default container {:?}", level));
    level
}

/// Привязывает herder к container'у (re-parent) и назначает display index
///
/// Повторный вызов с `None` привязывает к тому же level по умолчанию.
pub fn initialize_herder(
    world: &mut World,
    herder: Entity,
    container: Option<Entity>,
    display_index: u32,
) -> Result<Entity, HerderError> {
    if !world.entities().contains(herder) || world.get::<Herder>(herder).is_none() {
        return Err(HerderError::NotAHerder(herder));
    }

    let container = match container {
        Some(container) if world.entities().contains(container) => container,
        Some(container) => return Err(HerderError::UnknownContainer(container)),
        None => default_level(world),
    };

    world.entity_mut(herder).insert(ChildOf(container));

    if let Some(mut component) = world.get_mut::<Herder>(herder) {
        component.initialize(container, display_index);
        crate::log(&format!(
            "{} bound to container {:?}",
            component.label(),
            container
        ));
    }

    Ok(container)
}
