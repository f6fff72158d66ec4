//! Spatial queries (внешняя capability для perception)
//!
//! Ядро herder'а не знает как устроен broad-phase: оно спрашивает
//! "кто рядом" и "свободна ли линия" через `SpatialQuery`.
//! Engine bridge подставляет свою реализацию (raycast физического движка),
//! headless режим использует `ArenaIndex` (brute-force по компонентам).

use bevy::prelude::*;

pub mod arena;
pub mod category;

pub use arena::{rebuild_arena_index, ArenaIndex, ArenaPlugin};
pub use category::{Category, CategoryMask};

/// Кандидат из radius query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Vec3,
    /// Флаг цели "уже в safe zone" (читается, не изменяется herder'ом)
    pub reached_safety: bool,
}

/// Capability: пространственные запросы к арене
pub trait SpatialQuery {
    /// Все сущности категорий `filter` в радиусе `radius` (включительно) от `center`.
    ///
    /// Порядок результата: деталь реализации, ядро на него не полагается
    /// (кроме legacy `SelectionPolicy::FirstFound`).
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: CategoryMask) -> Vec<Candidate>;

    /// true если отрезок `from → to` не пересекает ни одного препятствия из `obstacles`
    fn is_path_clear(&self, from: Vec3, to: Vec3, obstacles: CategoryMask) -> bool;
}
