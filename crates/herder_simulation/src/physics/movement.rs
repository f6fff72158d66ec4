//! Kinematic locomotion для herder'ов
//!
//! Архитектура:
//! - Integrator внешний: core только запрашивает move/rotate через
//!   `KinematicBody`
//! - Headless integrator: `TransformBody` поверх Transform
//!   (доступен пока есть ресурс `KinematicIntegrator`)
//!
//! Детерминизм: FixedUpdate, смещение от `Time<Fixed>::timestep()`.

use bevy::prelude::*;

use super::events::ContactEvent;
use super::locomotion::{KinematicBody, ParentedBody, TransformBody};
use crate::ai::HerderDisabled;
use crate::components::{world_transform, Herder, WorldPoses};

/// Маркер: kinematic integrator подключён
///
/// Без него `herder_locomotion` отключает herder'ов (нет capability).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct KinematicIntegrator;

/// Body поверх Transform herder'а
///
/// Внутри container'а Transform локальный: integrator получает world-space
/// запросы через `ParentedBody`.
fn with_body<R>(
    local: &mut Transform,
    container: Option<&ChildOf>,
    poses: &WorldPoses,
    apply: impl FnOnce(&mut dyn KinematicBody) -> R,
) -> R {
    match container {
        Some(container) => apply(&mut ParentedBody {
            local,
            parent: world_transform(container.parent(), poses),
        }),
        None => apply(&mut TransformBody(local)),
    }
}

/// Система: bounce от стен/препятствий
///
/// Работает в FixedUpdate перед locomotion: разворот применяется в том же step.
pub fn herder_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut herders: Query<(&mut Herder, &mut Transform, Option<&ChildOf>)>,
    poses: WorldPoses,
    integrator: Option<Res<KinematicIntegrator>>,
    time: Res<Time<Fixed>>,
) {
    let step_secs = time.timestep().as_secs_f32();

    for contact in contacts.read() {
        let Ok((mut herder, mut transform, container)) = herders.get_mut(contact.herder) else {
            continue;
        };

        let bounced = if integrator.is_some() {
            with_body(&mut transform, container, &poses, |body| {
                herder.on_contact(contact.category, Some(body), step_secs)
            })
        } else {
            herder.on_contact(contact.category, None, step_secs)
        };

        if bounced {
            crate::log(&format!(
                "{}: bounced off {} → {:?}",
                herder.label(),
                contact.category.name(),
                herder.desired_direction()
            ));
        }
    }
}

/// Система: один fixed step движения для всех herder'ов
pub fn herder_locomotion(
    mut herders: Query<(Entity, &mut Herder, &mut Transform, Option<&ChildOf>)>,
    poses: WorldPoses,
    integrator: Option<Res<KinematicIntegrator>>,
    time: Res<Time<Fixed>>,
    mut disabled: EventWriter<HerderDisabled>,
) {
    let step_secs = time.timestep().as_secs_f32();

    for (entity, mut herder, mut transform, container) in herders.iter_mut() {
        let result = if integrator.is_some() {
            with_body(&mut transform, container, &poses, |body| {
                herder.physics_step(Some(body), step_secs)
            })
        } else {
            herder.physics_step(None, step_secs)
        };

        if let Err(reason) = result {
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
        }
    }
}

/// Plugin: contact events + locomotion системы (FixedUpdate)
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactEvent>().add_systems(
            FixedUpdate,
            (
                herder_contacts.in_set(crate::SimulationSet::Contacts),
                herder_locomotion.in_set(crate::SimulationSet::Locomotion),
            ),
        );
    }
}

/// Plugin: headless kinematic integrator
pub struct KinematicIntegratorPlugin;

impl Plugin for KinematicIntegratorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KinematicIntegrator>();
    }
}
