//! Herder: агент, который сгоняет prey в safe zone
//!
//! Компонент владеет всем transient состоянием агента (state, desired
//! direction/speed, ссылка на текущую цель). Позиция и facing: это
//! `Transform` той же entity.
//!
//! Entry points (вызываются системами, см. `ai::systems` и `physics::movement`):
//! - `logic_tick`: perception + decision, раз в frame
//! - `physics_step`: locomotion, раз в fixed step
//! - `on_contact`: bounce от стены
//!
//! Пока `active == false` ни одно поле кроме флага не меняется.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::fsm::{classify, HerderState};
use crate::ai::perception::select_target;
use crate::ai::steering::{flatten, steer, SteeringContext};
use crate::config::{ConfigError, HerderConfig};
use crate::error::HerderError;
use crate::physics::locomotion::{face_towards, integrate, KinematicBody};
use crate::spatial::{Category, CategoryMask, SpatialQuery};

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Herder {
    config: HerderConfig,
    active: bool,
    state: HerderState,
    desired_direction: Vec3,
    desired_speed: f32,
    /// Текущая цель (non-owning, пересчитывается каждый tick)
    target: Option<Entity>,
    /// Level/container, к которому привязан herder
    container: Option<Entity>,
    display_index: u32,
}

impl Herder {
    /// Создаёт herder'а, отклоняя невалидную конфигурацию
    pub fn new(config: HerderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            active: true,
            state: HerderState::Search,
            desired_direction: Vec3::ZERO,
            desired_speed: 0.0,
            target: None,
            container: None,
            display_index: 0,
        })
    }

    pub fn config(&self) -> &HerderConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn state(&self) -> HerderState {
        self.state
    }

    pub fn desired_direction(&self) -> Vec3 {
        self.desired_direction
    }

    pub fn desired_speed(&self) -> f32 {
        self.desired_speed
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn container(&self) -> Option<Entity> {
        self.container
    }

    pub fn display_index(&self) -> u32 {
        self.display_index
    }

    pub fn label(&self) -> String {
        format!("Herder #{}", self.display_index)
    }

    /// Привязка к container'у и display index (см. `level::initialize_herder`)
    pub fn initialize(&mut self, container: Entity, display_index: u32) {
        self.container = Some(container);
        self.display_index = display_index;
    }

    /// Внешнее переопределение движения (direction проецируется на плоскость,
    /// speed ограничивается [0, max_speed])
    pub fn set_desired_motion(&mut self, direction: Vec3, speed: f32) {
        if !self.active {
            return;
        }
        self.desired_direction = flatten(direction).unwrap_or(Vec3::ZERO);
        self.desired_speed = speed.clamp(0.0, self.config.max_speed);
    }

    /// Сброс направления: следующий wander выберет новое
    pub fn clear_direction(&mut self) {
        if !self.active {
            return;
        }
        self.desired_direction = Vec3::ZERO;
        self.desired_speed = 0.0;
    }

    /// Perception + decision + steering на один frame
    ///
    /// Без spatial capability herder отключается и возвращает ошибку.
    pub fn logic_tick(
        &mut self,
        pose: &Transform,
        spatial: Option<&dyn SpatialQuery>,
        safe_zone: Option<Vec3>,
        rng: &mut impl Rng,
    ) -> Result<(), HerderError> {
        if !self.active {
            return Ok(());
        }

        let Some(spatial) = spatial else {
            self.active = false;
            return Err(HerderError::MissingSpatialQuery);
        };

        let selected = select_target(
            spatial,
            pose.translation,
            self.config.sight_radius,
            CategoryMask::TARGETS,
            CategoryMask::OCCLUDERS,
            self.config.selection,
        );

        self.target = selected.map(|s| s.entity);
        self.state = classify(selected.map(|s| s.distance), &self.config);

        let ctx = SteeringContext {
            position: pose.translation,
            forward: pose.forward().as_vec3(),
            current_direction: self.desired_direction,
            target: selected.map(|s| s.position),
            safe_zone,
            config: &self.config,
        };
        let output = steer(self.state, &ctx, rng);

        self.desired_direction = output.direction;
        self.desired_speed = output.speed;

        Ok(())
    }

    /// Locomotion на один fixed step
    ///
    /// Без integrator'а herder отключается и возвращает ошибку.
    pub fn physics_step(
        &mut self,
        body: Option<&mut dyn KinematicBody>,
        step_secs: f32,
    ) -> Result<(), HerderError> {
        if !self.active {
            return Ok(());
        }

        let Some(body) = body else {
            self.active = false;
            return Err(HerderError::MissingIntegrator);
        };

        integrate(
            body,
            self.desired_direction,
            self.desired_speed,
            step_secs,
            self.config.max_turn_per_step(step_secs),
        );

        Ok(())
    }

    /// Контакт с сущностью категории `category`
    ///
    /// Стена/препятствие → разворот направления (naive bounce, без отражения)
    /// и rate-limited поворот к новому направлению. Возвращает true если
    /// направление развёрнуто.
    pub fn on_contact(
        &mut self,
        category: Category,
        body: Option<&mut dyn KinematicBody>,
        step_secs: f32,
    ) -> bool {
        if !self.active || !category.is_blocking() || self.desired_direction == Vec3::ZERO {
            return false;
        }

        self.desired_direction = -self.desired_direction;

        if let Some(body) = body {
            face_towards(
                body,
                self.desired_direction,
                self.config.max_turn_per_step(step_secs),
            );
        }

        true
    }
}

/// Spawn helper: herder с валидированной конфигурацией
pub fn spawn_herder(
    commands: &mut Commands,
    position: Vec3,
    config: HerderConfig,
) -> Result<Entity, ConfigError> {
    let herder = Herder::new(config)?;
    Ok(commands
        .spawn((Transform::from_translation(position), herder))
        .id())
}
