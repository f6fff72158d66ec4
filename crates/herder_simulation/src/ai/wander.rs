//! Wander: поведение по умолчанию и универсальный fallback
//!
//! Уже заданное направление не трогаем (иначе направление дёргается каждый
//! тик). Новое выбираем только когда текущее нулевое: первый тик или после
//! явного сброса.

use bevy::prelude::*;
use rand::Rng;

use super::steering::{flatten, SteeringOutput};
use crate::config::HerderConfig;

pub fn wander(
    current_direction: Vec3,
    forward: Vec3,
    config: &HerderConfig,
    rng: &mut impl Rng,
) -> SteeringOutput {
    let speed = config.wander_speed();

    if let Some(direction) = flatten(current_direction) {
        return SteeringOutput { direction, speed };
    }

    // Forward вырожден (смотрит строго вверх/вниз) → host convention −Z
    let base = flatten(forward).unwrap_or(Vec3::NEG_Z);
    let arc = config.wander_arc_degrees.to_radians();
    let angle = rng.gen_range(-arc..=arc);
    let direction = (Quat::from_rotation_y(angle) * base).normalize_or_zero();

    SteeringOutput { direction, speed }
}
