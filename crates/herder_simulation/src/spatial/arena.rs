//! ArenaIndex: headless реализация `SpatialQuery`
//!
//! Пересобирается каждый frame из `Prey` и `Obstacle` компонентов.
//! Brute-force O(n) на запрос: арена маленькая, broad-phase не нужен.
//! Препятствия: сферы и axis-aligned боксы (rotation игнорируется).

use bevy::prelude::*;

use super::{Candidate, Category, CategoryMask, SpatialQuery};
use crate::components::{world_transform, Obstacle, ObstacleShape, Prey, WorldPoses};

#[derive(Debug, Clone, Copy)]
struct ArenaBody {
    entity: Entity,
    position: Vec3,
    category: Category,
    reached_safety: bool,
}

#[derive(Debug, Clone, Copy)]
struct ArenaOccluder {
    center: Vec3,
    category: Category,
    shape: ObstacleShape,
}

/// Snapshot арены для perception текущего frame
#[derive(Resource, Debug, Default)]
pub struct ArenaIndex {
    bodies: Vec<ArenaBody>,
    occluders: Vec<ArenaOccluder>,
}

impl ArenaIndex {
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.occluders.clear();
    }

    pub fn insert_prey(&mut self, entity: Entity, position: Vec3, reached_safety: bool) {
        self.bodies.push(ArenaBody {
            entity,
            position,
            category: Category::Prey,
            reached_safety,
        });
    }

    pub fn insert_obstacle(&mut self, center: Vec3, obstacle: &Obstacle) {
        self.occluders.push(ArenaOccluder {
            center,
            category: obstacle.category,
            shape: obstacle.shape,
        });
    }

    pub fn prey_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.occluders.len()
    }
}

impl SpatialQuery for ArenaIndex {
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: CategoryMask) -> Vec<Candidate> {
        let radius_sq = radius * radius;

        self.bodies
            .iter()
            .filter(|body| filter.contains(body.category))
            .filter(|body| body.position.distance_squared(center) <= radius_sq)
            .map(|body| Candidate {
                entity: body.entity,
                position: body.position,
                reached_safety: body.reached_safety,
            })
            .collect()
    }

    fn is_path_clear(&self, from: Vec3, to: Vec3, obstacles: CategoryMask) -> bool {
        !self
            .occluders
            .iter()
            .filter(|occluder| obstacles.contains(occluder.category))
            .any(|occluder| segment_hits_shape(from, to, occluder.center, occluder.shape))
    }
}

/// Касание поверхности в начале отрезка не считается перекрытием
/// (herder, стоящий вплотную к стене, видит от неё)
const SURFACE_EPSILON: f32 = 1e-4;

fn segment_hits_shape(from: Vec3, to: Vec3, center: Vec3, shape: ObstacleShape) -> bool {
    match shape {
        ObstacleShape::Sphere { radius } => segment_hits_sphere(from, to, center, radius),
        ObstacleShape::Box { half_extents } => {
            segment_hits_aabb(from, to, center - half_extents, center + half_extents)
        }
    }
}

fn segment_hits_sphere(from: Vec3, to: Vec3, center: Vec3, radius: f32) -> bool {
    let segment = to - from;
    let length_sq = segment.length_squared();

    // Ближайшая к центру точка отрезка
    let t = if length_sq > f32::EPSILON {
        ((center - from).dot(segment) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = from + segment * t;

    // Старт на поверхности, отрезок уходит наружу (t = 0 ближайшая точка)
    if t <= 0.0 && (from.distance(center) - radius).abs() <= SURFACE_EPSILON {
        return false;
    }

    closest.distance_squared(center) <= radius * radius
}

/// Slab test: отрезок `from + t·(to − from)`, t ∈ [0, 1] против AABB
fn segment_hits_aabb(from: Vec3, to: Vec3, min: Vec3, max: Vec3) -> bool {
    let delta = to - from;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..3 {
        let origin = from[axis];
        let direction = delta[axis];
        let (low, high) = (min[axis], max[axis]);

        if direction.abs() < f32::EPSILON {
            // Параллельно slab'у: либо внутри на всём протяжении, либо промах
            if origin < low || origin > high {
                return false;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let mut t0 = (low - origin) * inv;
        let mut t1 = (high - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return false;
        }
    }

    // Отрезок только касается бокса в начальной точке
    t_exit > SURFACE_EPSILON || delta.length_squared() <= f32::EPSILON
}

/// Система: пересборка ArenaIndex из компонентов мира
///
/// Позиции в world space (prey/препятствия могут быть детьми level'а).
pub fn rebuild_arena_index(
    mut arena: ResMut<ArenaIndex>,
    prey: Query<(Entity, &Prey)>,
    obstacles: Query<(Entity, &Obstacle)>,
    poses: WorldPoses,
) {
    arena.clear();

    for (entity, prey) in prey.iter() {
        let position = world_transform(entity, &poses).translation;
        arena.insert_prey(entity, position, prey.reached_safety);
    }

    for (entity, obstacle) in obstacles.iter() {
        arena.insert_obstacle(world_transform(entity, &poses).translation, obstacle);
    }
}

/// Plugin: headless spatial query backend
///
/// Без этого plugin'а `ArenaIndex` отсутствует и herder'ы отключаются
/// на первом же logic tick (нет spatial capability).
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaIndex>()
            .add_systems(Update, rebuild_arena_index.in_set(crate::SimulationSet::Perception));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(half_extents: Vec3) -> Obstacle {
        Obstacle {
            category: Category::Boundary,
            shape: ObstacleShape::Box { half_extents },
        }
    }

    #[test]
    fn test_overlap_sphere_is_inclusive() {
        let mut arena = ArenaIndex::default();
        let inside = Entity::from_raw(1);
        let edge = Entity::from_raw(2);
        let outside = Entity::from_raw(3);
        arena.insert_prey(inside, Vec3::new(3.0, 0.0, 0.0), false);
        arena.insert_prey(edge, Vec3::new(0.0, 0.0, 7.5), false);
        arena.insert_prey(outside, Vec3::new(7.6, 0.0, 0.0), false);

        let found: Vec<Entity> = arena
            .overlap_sphere(Vec3::ZERO, 7.5, CategoryMask::TARGETS)
            .iter()
            .map(|c| c.entity)
            .collect();

        assert_eq!(found, vec![inside, edge]);
    }

    #[test]
    fn test_overlap_sphere_respects_filter() {
        let mut arena = ArenaIndex::default();
        arena.insert_prey(Entity::from_raw(1), Vec3::X, false);

        let found = arena.overlap_sphere(Vec3::ZERO, 5.0, CategoryMask::from(Category::SafeZone));
        assert!(found.is_empty());
    }

    #[test]
    fn test_box_blocks_segment() {
        let mut arena = ArenaIndex::default();
        arena.insert_obstacle(Vec3::new(2.0, 0.0, 0.0), &wall(Vec3::new(0.25, 1.0, 2.0)));

        assert!(!arena.is_path_clear(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), CategoryMask::OCCLUDERS));
        // Отрезок заканчивается до стены
        assert!(arena.is_path_clear(Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0), CategoryMask::OCCLUDERS));
        // Отрезок проходит сбоку
        assert!(arena.is_path_clear(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(4.0, 0.0, 3.0),
            CategoryMask::OCCLUDERS
        ));
    }

    #[test]
    fn test_sphere_blocks_segment() {
        let mut arena = ArenaIndex::default();
        let rock = Obstacle {
            category: Category::Obstacle,
            shape: ObstacleShape::Sphere { radius: 0.5 },
        };
        arena.insert_obstacle(Vec3::new(2.0, 0.0, 0.2), &rock);

        assert!(!arena.is_path_clear(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), CategoryMask::OCCLUDERS));
        assert!(arena.is_path_clear(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(4.0, 0.0, 2.0),
            CategoryMask::OCCLUDERS
        ));
    }

    #[test]
    fn test_obstacle_filter_ignored_when_not_in_mask() {
        let mut arena = ArenaIndex::default();
        arena.insert_obstacle(Vec3::new(2.0, 0.0, 0.0), &wall(Vec3::splat(0.5)));

        let only_rocks = CategoryMask::from(Category::Obstacle);
        assert!(arena.is_path_clear(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), only_rocks));
    }

    #[test]
    fn test_segment_starting_on_wall_face_is_clear() {
        let mut arena = ArenaIndex::default();
        arena.insert_obstacle(Vec3::new(15.0, 0.0, 0.0), &wall(Vec3::new(0.5, 1.0, 15.0)));

        // Herder вплотную к стене смотрит внутрь арены
        assert!(arena.is_path_clear(
            Vec3::new(14.5, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            CategoryMask::OCCLUDERS
        ));
        assert!(arena.is_path_clear(
            Vec3::new(14.5, 0.0, 2.0),
            Vec3::new(10.0, 0.0, -3.0),
            CategoryMask::OCCLUDERS
        ));
        // Сквозь стену по-прежнему не видно
        assert!(!arena.is_path_clear(
            Vec3::new(14.5, 0.0, 0.0),
            Vec3::new(17.0, 0.0, 0.0),
            CategoryMask::OCCLUDERS
        ));
    }

    #[test]
    fn test_segment_starting_on_rock_surface_is_clear() {
        let mut arena = ArenaIndex::default();
        arena.insert_obstacle(Vec3::ZERO, &Obstacle::rock(1.0));

        assert!(arena.is_path_clear(Vec3::X, Vec3::new(5.0, 0.0, 0.0), CategoryMask::OCCLUDERS));
        assert!(!arena.is_path_clear(Vec3::X, Vec3::new(-5.0, 0.0, 0.0), CategoryMask::OCCLUDERS));
    }

    #[test]
    fn test_degenerate_segment() {
        let mut arena = ArenaIndex::default();
        arena.insert_obstacle(Vec3::ZERO, &wall(Vec3::splat(1.0)));

        // Точка внутри бокса: заблокирована, снаружи: свободна
        assert!(!arena.is_path_clear(Vec3::ZERO, Vec3::ZERO, CategoryMask::OCCLUDERS));
        assert!(arena.is_path_clear(Vec3::splat(3.0), Vec3::splat(3.0), CategoryMask::OCCLUDERS));
    }

    #[test]
    fn test_rebuild_from_world() {
        use bevy::ecs::system::RunSystemOnce;

        let mut world = World::new();
        world.init_resource::<ArenaIndex>();
        let sheep = world
            .spawn((Transform::from_xyz(1.0, 0.0, 0.0), Prey::default()))
            .id();
        world.spawn((
            Transform::from_xyz(-2.0, 0.0, 0.0),
            Prey {
                reached_safety: true,
            },
        ));
        world.spawn((Transform::from_xyz(0.0, 0.0, 5.0), Obstacle::rock(1.0)));

        world
            .run_system_once(rebuild_arena_index)
            .expect("rebuild runs");
        // Повторная пересборка не дублирует записи
        world
            .run_system_once(rebuild_arena_index)
            .expect("rebuild runs");

        let arena = world.resource::<ArenaIndex>();
        assert_eq!(arena.prey_count(), 2);
        assert_eq!(arena.obstacle_count(), 1);

        let near = arena.overlap_sphere(Vec3::ZERO, 1.5, CategoryMask::TARGETS);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].entity, sheep);
        assert!(!near[0].reached_safety);
    }
}
