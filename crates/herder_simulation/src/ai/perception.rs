//! Perception: выбор цели herder'а
//!
//! Radius query → отсев по line of sight и флагу safety → выбор одного.

use bevy::prelude::*;

use crate::config::SelectionPolicy;
use crate::spatial::{CategoryMask, SpatialQuery};

/// Цель, выбранная на текущем тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedTarget {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

/// Выбирает цель среди кандидатов в радиусе `sight_radius`.
///
/// Кандидат отсеивается если:
/// - между herder'ом и кандидатом есть препятствие из `obstacles`
/// - кандидат уже в safe zone
///
/// `None`: не ошибка, а "никого не видим".
pub fn select_target(
    spatial: &dyn SpatialQuery,
    origin: Vec3,
    sight_radius: f32,
    candidates: CategoryMask,
    obstacles: CategoryMask,
    policy: SelectionPolicy,
) -> Option<SelectedTarget> {
    let mut eligible = spatial
        .overlap_sphere(origin, sight_radius, candidates)
        .into_iter()
        .filter(|candidate| !candidate.reached_safety)
        .filter(|candidate| spatial.is_path_clear(origin, candidate.position, obstacles))
        .map(|candidate| SelectedTarget {
            entity: candidate.entity,
            position: candidate.position,
            distance: origin.distance(candidate.position),
        });

    match policy {
        SelectionPolicy::Nearest => eligible.min_by(|a, b| a.distance.total_cmp(&b.distance)),
        SelectionPolicy::FirstFound => eligible.next(),
    }
}
