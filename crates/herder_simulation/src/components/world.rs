//! World компоненты: prey, safe zone, препятствия
//!
//! Поведение prey и safe zone: ответственность хоста (engine/scene).
//! Herder их только читает.

use bevy::prelude::*;

use crate::spatial::Category;

/// Цель herder'а (овца)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Prey {
    /// Цель уже в safe zone: herder её игнорирует
    pub reached_safety: bool,
}

/// Landmark: цель herding'а
///
/// Ожидается один на арену. Если их несколько: herder берёт первый
/// по Entity.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct SafeZone;

/// Форма препятствия (центр: Transform.translation, rotation игнорируется)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ObstacleShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

/// Препятствие: блокирует line of sight, контакт → bounce
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Obstacle {
    pub category: Category,
    pub shape: ObstacleShape,
}

impl Obstacle {
    /// Стена арены (axis-aligned бокс)
    pub fn wall(half_extents: Vec3) -> Self {
        Self {
            category: Category::Boundary,
            shape: ObstacleShape::Box { half_extents },
        }
    }

    /// Препятствие внутри арены (камень, дерево)
    pub fn rock(radius: f32) -> Self {
        Self {
            category: Category::Obstacle,
            shape: ObstacleShape::Sphere { radius },
        }
    }
}

pub fn spawn_prey(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((Transform::from_translation(position), Prey::default()))
        .id()
}

pub fn spawn_safe_zone(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((Transform::from_translation(position), SafeZone))
        .id()
}

pub fn spawn_obstacle(commands: &mut Commands, position: Vec3, obstacle: Obstacle) -> Entity {
    commands
        .spawn((Transform::from_translation(position), obstacle))
        .id()
}
