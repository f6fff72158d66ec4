//! Headless herder симуляция
//!
//! Спавнит маленькую арену (herder, несколько prey, safe zone, стены)
//! и гоняет её в lockstep без рендера.
//!
//! ```text
//! herder_simulation [--config PATH] [--seed N] [--ticks N] [--verbose]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::Parser;
use thiserror::Error;

use herder_simulation::logger::{set_log_level, LogLevel};
use herder_simulation::{
    create_simulation_app, init_logger, initialize_herder, log_error, log_info, run_lockstep,
    Category, ConfigError, ContactEvent, Herder, HerderError, Obstacle, Prey, SafeZone,
    SimulationConfig,
};

/// Полуразмер арены (стены по периметру)
const ARENA_HALF_EXTENT: f32 = 15.0;
const WALL_THICKNESS: f32 = 0.5;
const REPORT_EVERY: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "herder_simulation", about = "Headless herder simulation")]
struct Cli {
    /// TOML конфигурация (по умолчанию: встроенные значения)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Переопределяет seed из конфигурации
    #[arg(long)]
    seed: Option<u64>,

    /// Количество lockstep тиков
    #[arg(long, default_value_t = 500)]
    ticks: usize,

    /// Debug логи (state transitions, bounce)
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Herder(#[from] HerderError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger();
    set_log_level(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(&format!("Simulation failed: {}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunnerError> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    log_info(&format!(
        "Starting herder simulation (seed: {}, fixed: {} Hz, ticks: {})",
        config.seed, config.fixed_hz, cli.ticks
    ));

    let mut app = create_simulation_app(&config)?;
    let herder = spawn_arena(app.world_mut(), &config)?;

    for tick in 0..cli.ticks {
        run_lockstep(&mut app, 1);
        report_wall_contact(app.world_mut(), herder);

        if tick % REPORT_EVERY == 0 {
            report(app.world(), herder, tick);
        }
    }

    report(app.world(), herder, cli.ticks);
    log_info("Simulation complete!");
    Ok(())
}

fn spawn_arena(world: &mut World, config: &SimulationConfig) -> Result<Entity, RunnerError> {
    let herder = world
        .spawn((Transform::default(), Herder::new(config.herder.clone())?))
        .id();
    initialize_herder(world, herder, None, 1)?;

    world.spawn((Transform::from_xyz(0.0, 0.0, -12.0), SafeZone));

    for position in [
        Vec3::new(4.0, 0.0, -3.0),
        Vec3::new(-5.0, 0.0, 2.0),
        Vec3::new(9.0, 0.0, 6.0),
    ] {
        world.spawn((Transform::from_translation(position), Prey::default()));
    }

    world.spawn((Transform::from_xyz(2.0, 0.0, 4.0), Obstacle::rock(1.0)));

    let long = Vec3::new(ARENA_HALF_EXTENT, 1.0, WALL_THICKNESS);
    let side = Vec3::new(WALL_THICKNESS, 1.0, ARENA_HALF_EXTENT);
    for (position, half_extents) in [
        (Vec3::new(0.0, 0.0, ARENA_HALF_EXTENT), long),
        (Vec3::new(0.0, 0.0, -ARENA_HALF_EXTENT), long),
        (Vec3::new(ARENA_HALF_EXTENT, 0.0, 0.0), side),
        (Vec3::new(-ARENA_HALF_EXTENT, 0.0, 0.0), side),
    ] {
        world.spawn((Transform::from_translation(position), Obstacle::wall(half_extents)));
    }

    Ok(herder)
}

/// Headless integrator не считает коллизии: упёрлись в стену арены → ContactEvent
fn report_wall_contact(world: &mut World, herder: Entity) {
    let Some(position) = world.get::<Transform>(herder).map(|t| t.translation) else {
        return;
    };

    let limit = ARENA_HALF_EXTENT - WALL_THICKNESS;
    if position.x.abs() >= limit || position.z.abs() >= limit {
        world.send_event(ContactEvent {
            herder,
            category: Category::Boundary,
        });
    }
}

fn report(world: &World, herder: Entity, tick: usize) {
    let (Some(component), Some(transform)) =
        (world.get::<Herder>(herder), world.get::<Transform>(herder))
    else {
        return;
    };

    log_info(&format!(
        "Tick {}: {} state={} pos=({:.2}, {:.2}) target={:?} active={}",
        tick,
        component.label(),
        component.state().as_str(),
        transform.translation.x,
        transform.translation.z,
        component.target(),
        component.is_active()
    ));
}
