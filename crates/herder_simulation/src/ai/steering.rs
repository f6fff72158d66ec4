//! Steering policy: state → желаемое направление и скорость
//!
//! Каждое состояние требует свои ориентиры (цель, safe zone). Если ориентира
//! нет, или геометрия вырождена (нулевое направление): fallback в wander.
//! Отсутствие ориентира не является ошибкой.

use bevy::prelude::*;
use rand::Rng;

use super::fsm::HerderState;
use super::wander::wander;
use crate::config::HerderConfig;

/// Желаемое движение (потребляется LocomotionAdapter'ом)
///
/// Инвариант: direction: ноль или единичный горизонтальный вектор.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringOutput {
    pub direction: Vec3,
    pub speed: f32,
}

/// Всё что steering знает о мире на этом тике
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    pub position: Vec3,
    pub forward: Vec3,
    pub current_direction: Vec3,
    pub target: Option<Vec3>,
    pub safe_zone: Option<Vec3>,
    pub config: &'a HerderConfig,
}

/// Проекция на горизонтальную плоскость + нормализация (`None` для нулевого)
pub fn flatten(vector: Vec3) -> Option<Vec3> {
    Vec3::new(vector.x, 0.0, vector.z).try_normalize()
}

/// Горизонтальное направление `from → to`
pub fn planar_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    flatten(to - from)
}

/// Stand-off точка: `distance` за целью на продолжении линии safe zone → цель
///
/// `None` если цель стоит ровно в safe zone (направление не определено).
pub fn standoff_point(target: Vec3, safe_zone: Vec3, distance: f32) -> Option<Vec3> {
    let toward_goal = planar_direction(target, safe_zone)?;
    Some(target - toward_goal * distance)
}

pub fn steer(state: HerderState, ctx: &SteeringContext, rng: &mut impl Rng) -> SteeringOutput {
    let preferred = match state {
        HerderState::Search => None,
        HerderState::Sneak => sneak(ctx),
        HerderState::Threat => threat(ctx),
        HerderState::Friend => friend(ctx),
    };

    preferred.unwrap_or_else(|| wander(ctx.current_direction, ctx.forward, ctx.config, rng))
}

/// Обходим цель и давим её в сторону safe zone
fn threat(ctx: &SteeringContext) -> Option<SteeringOutput> {
    let target = ctx.target?;
    let safe_zone = ctx.safe_zone?;
    let standoff = standoff_point(target, safe_zone, ctx.config.standoff_distance)?;

    Some(SteeringOutput {
        direction: planar_direction(ctx.position, standoff)?,
        speed: ctx.config.herd_speed(),
    })
}

/// Медленно подходим прямо к цели (никакой маскировки, только скорость)
fn sneak(ctx: &SteeringContext) -> Option<SteeringOutput> {
    let target = ctx.target?;

    Some(SteeringOutput {
        direction: planar_direction(ctx.position, target)?,
        speed: ctx.config.sneak_speed(),
    })
}

/// Цель рядом: идём к safe zone, она следует за нами
fn friend(ctx: &SteeringContext) -> Option<SteeringOutput> {
    let safe_zone = ctx.safe_zone?;

    Some(SteeringOutput {
        direction: planar_direction(ctx.position, safe_zone)?,
        speed: ctx.config.max_speed,
    })
}
