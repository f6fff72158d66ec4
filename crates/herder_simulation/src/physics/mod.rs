//! Physics module
//!
//! Locomotion поверх внешнего kinematic integrator'а: смещение + rate-limited
//! поворот раз в fixed step, bounce по contact событиям.

pub mod events;
pub mod locomotion;
pub mod movement;

// Re-export основных типов
pub use events::ContactEvent;
pub use locomotion::{KinematicBody, ParentedBody, TransformBody};
pub use movement::{
    herder_contacts, herder_locomotion, KinematicIntegrator, KinematicIntegratorPlugin,
    LocomotionPlugin,
};
