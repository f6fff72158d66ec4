//! LocomotionAdapter: desired direction/speed → запрос к physics integrator'у
//!
//! Вызывается только из FixedUpdate: смещение считается от fixed step,
//! поэтому поведение не зависит от frame rate.
//!
//! Facing: host convention: forward = −Z, поворот только по yaw (+Y).

use bevy::prelude::*;

/// Тело, которое двигает внешний integrator
///
/// Engine bridge реализует поверх своего rigidbody/character controller'а,
/// headless режим: поверх `Transform` (`TransformBody`).
pub trait KinematicBody {
    fn rotation(&self) -> Quat;
    fn move_by(&mut self, displacement: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
}

/// Headless тело: запросы применяются к Transform напрямую
pub struct TransformBody<'a>(pub &'a mut Transform);

impl KinematicBody for TransformBody<'_> {
    fn rotation(&self) -> Quat {
        self.0.rotation
    }

    fn move_by(&mut self, displacement: Vec3) {
        self.0.translation += displacement;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.0.rotation = rotation;
    }
}

/// Тело внутри container'а: запросы в world space, Transform в локальном
///
/// `parent`: world transform container'а. Scale container'а считается
/// ненулевым.
pub struct ParentedBody<'a> {
    pub local: &'a mut Transform,
    pub parent: Transform,
}

impl ParentedBody<'_> {
    /// World pose тела
    pub fn world(&self) -> Transform {
        self.parent.mul_transform(*self.local)
    }
}

impl KinematicBody for ParentedBody<'_> {
    fn rotation(&self) -> Quat {
        self.parent.rotation * self.local.rotation
    }

    fn move_by(&mut self, displacement: Vec3) {
        self.local.translation += (self.parent.rotation.inverse() * displacement) / self.parent.scale;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.local.rotation = (self.parent.rotation.inverse() * rotation).normalize();
    }
}

/// Смещение за один fixed step, вертикальная компонента обнулена
pub fn planar_displacement(direction: Vec3, speed: f32, step_secs: f32) -> Vec3 {
    let mut displacement = direction * speed * step_secs;
    displacement.y = 0.0;
    displacement
}

/// Yaw rotation, при которой forward (−Z) смотрит вдоль `direction`
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let planar = Vec3::new(direction.x, 0.0, direction.z).try_normalize()?;
    Some(Quat::from_rotation_y(f32::atan2(-planar.x, -planar.z)))
}

/// Поворот `from → to`, не больше `max_angle` радиан за вызов
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle / angle)
}

/// Rate-limited поворот тела к `direction` (нулевое направление: no-op)
pub fn face_towards(body: &mut dyn KinematicBody, direction: Vec3, max_angle: f32) {
    if let Some(target) = facing_rotation(direction) {
        let rotation = rotate_towards(body.rotation(), target, max_angle);
        body.set_rotation(rotation);
    }
}

/// Один fixed step: сдвиг + поворот к направлению сдвига.
///
/// Возвращает фактически запрошенное смещение.
pub fn integrate(
    body: &mut dyn KinematicBody,
    direction: Vec3,
    speed: f32,
    step_secs: f32,
    max_turn: f32,
) -> Vec3 {
    let displacement = planar_displacement(direction, speed, step_secs);
    body.move_by(displacement);

    if displacement != Vec3::ZERO {
        face_towards(body, displacement, max_turn);
    }

    displacement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_for_one_fixed_step() {
        let displacement = planar_displacement(Vec3::X, 5.0, 0.02);
        assert!((displacement.x - 0.1).abs() < 1e-6, "x = {}", displacement.x);
        assert_eq!(displacement.y, 0.0);
        assert_eq!(displacement.z, 0.0);
    }

    #[test]
    fn test_displacement_drops_vertical_component() {
        let displacement = planar_displacement(Vec3::new(0.0, 1.0, 0.0), 5.0, 0.02);
        assert_eq!(displacement, Vec3::ZERO);
    }

    #[test]
    fn test_facing_rotation_points_forward_along_direction() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 1.0)] {
            let rotation = facing_rotation(direction).expect("planar direction");
            let forward = rotation * Vec3::NEG_Z;
            assert!(
                (forward - direction.normalize()).length() < 1e-5,
                "direction {:?} → forward {:?}",
                direction,
                forward
            );
        }
    }

    #[test]
    fn test_facing_rotation_undefined_for_vertical() {
        assert!(facing_rotation(Vec3::Y).is_none());
        assert!(facing_rotation(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_rotate_towards_is_rate_limited() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(std::f32::consts::PI / 2.0);
        let max = 360.0_f32.to_radians() * 0.02; // 7.2° за step

        let step = rotate_towards(from, to, max);
        assert!((from.angle_between(step) - max).abs() < 1e-4);
        assert!(step.angle_between(to) > 0.0);
    }

    #[test]
    fn test_rotate_towards_snaps_within_budget() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(0.05);
        assert_eq!(rotate_towards(from, to, 0.1), to);
    }

    #[test]
    fn test_integrate_moves_and_turns_body() {
        let mut transform = Transform::default();
        let max_turn = 360.0_f32.to_radians() * 0.02;

        let displacement = integrate(&mut TransformBody(&mut transform), Vec3::X, 5.0, 0.02, max_turn);

        assert!((displacement.x - 0.1).abs() < 1e-6);
        assert!((transform.translation - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-6);
        // Повернулись ровно на бюджет step'а, не больше
        assert!((Quat::IDENTITY.angle_between(transform.rotation) - max_turn).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_zero_speed_keeps_facing() {
        let mut transform = Transform::from_rotation(Quat::from_rotation_y(1.0));
        let before = transform;

        let displacement = integrate(&mut TransformBody(&mut transform), Vec3::X, 0.0, 0.02, 0.1);

        assert_eq!(displacement, Vec3::ZERO);
        assert_eq!(transform, before);
    }

    #[test]
    fn test_repeated_steps_converge_to_direction() {
        let mut transform = Transform::default();
        let max_turn = 360.0_f32.to_radians() * 0.02;

        // 180° разворот при 7.2°/step: 25 step'ов
        for _ in 0..30 {
            integrate(&mut TransformBody(&mut transform), Vec3::Z, 5.0, 0.02, max_turn);
        }

        let forward = transform.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::Z).length() < 1e-3, "forward = {:?}", forward);
    }

    #[test]
    fn test_parented_body_maps_world_requests_to_local() {
        let parent = Transform::from_xyz(10.0, 0.0, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let mut local = Transform::default();
        let mut body = ParentedBody {
            local: &mut local,
            parent,
        };

        body.move_by(Vec3::new(0.0, 0.0, -1.0));
        let target = facing_rotation(Vec3::X).expect("planar");
        body.set_rotation(target);

        let world = body.world();
        assert!((world.translation - Vec3::new(10.0, 0.0, -1.0)).length() < 1e-5);
        assert!(world.rotation.angle_between(target) < 1e-4);
        assert!(body.rotation().angle_between(target) < 1e-4);
    }
}
