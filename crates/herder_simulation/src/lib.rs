//! Herder Simulation Core
//!
//! ECS-симуляция herding агента на Bevy 0.16 (headless)
//!
//! Pipeline:
//! - Update: Perception (spatial index) → Decision (FSM + steering)
//! - FixedUpdate: Contacts (bounce) → Locomotion (integrator)
//!
//! Spatial query и kinematic integrator: внешние capabilities.
//! `SimulationPlugin` подключает headless реализации обеих,
//! `HerderCorePlugin`: только ядро (host подставляет свои backend'ы).

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod physics;
pub mod spatial;

// Re-export базовых типов для удобства
pub use ai::{HerderAIPlugin, HerderDisabled, HerderState};
pub use components::*;
pub use config::{ConfigError, HerderConfig, SelectionPolicy, SimulationConfig};
pub use error::HerderError;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::{ContactEvent, KinematicIntegrator, KinematicIntegratorPlugin, LocomotionPlugin};
pub use spatial::{ArenaIndex, ArenaPlugin, Category, CategoryMask, SpatialQuery};

/// Seed по умолчанию
pub const DEFAULT_SEED: u64 = 42;

/// Порядок систем внутри frame / fixed step
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Пересборка spatial index'а (Update)
    Perception,
    /// Logic tick herder'ов (Update)
    Decision,
    /// Bounce по ContactEvent (FixedUpdate)
    Contacts,
    /// Fixed step движения (FixedUpdate)
    Locomotion,
}

/// Ядро: AI + locomotion, без backend'ов
pub struct HerderCorePlugin;

impl Plugin for HerderCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DeterministicRng>()
            .configure_sets(
                Update,
                (SimulationSet::Perception, SimulationSet::Decision).chain(),
            )
            .configure_sets(
                FixedUpdate,
                (SimulationSet::Contacts, SimulationSet::Locomotion).chain(),
            )
            .add_plugins((HerderAIPlugin, LocomotionPlugin));
    }
}

/// Главный plugin симуляции: ядро + headless backend'ы
pub struct SimulationPlugin {
    /// Частота FixedUpdate (physics cadence)
    pub fixed_hz: f64,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self { fixed_hz: 50.0 }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 50Hz по умолчанию (step 0.02s)
            .insert_resource(Time::<Fixed>::from_hz(self.fixed_hz))
            .add_plugins((HerderCorePlugin, ArenaPlugin, KinematicIntegratorPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Plugins симуляции не добавляются: тесты выбирают `SimulationPlugin`
/// или голый `HerderCorePlugin`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Headless App с полной симуляцией по конфигурации
pub fn create_simulation_app(config: &SimulationConfig) -> Result<App, ConfigError> {
    config.validate()?;
    let mut app = create_headless_app(config.seed);
    app.add_plugins(SimulationPlugin {
        fixed_hz: config.fixed_hz,
    });
    Ok(app)
}

/// Lockstep: `ticks` раз Update + FixedUpdate
///
/// В отличие от `app.update()` не зависит от real time: ровно один fixed
/// step на frame. Event буферы обновляются в начале каждого тика, так что
/// события тика N видны до конца тика N+1.
pub fn run_lockstep(app: &mut App, ticks: usize) {
    if app.plugins_state() == bevy::app::PluginsState::Ready {
        app.finish();
        app.cleanup();
    }

    for _ in 0..ticks {
        let world = app.world_mut();
        update_events::<ContactEvent>(world);
        update_events::<HerderDisabled>(world);

        run_schedule_logged(world, Update);
        run_schedule_logged(world, FixedUpdate);
    }
}

/// Запускает schedule; отсутствующий schedule логируется (false)
fn run_schedule_logged(world: &mut World, label: impl ScheduleLabel) -> bool {
    match world.try_run_schedule(label) {
        Ok(()) => true,
        Err(err) => {
            log_warning(&format!("Lockstep: {}", err));
            false
        }
    }
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
