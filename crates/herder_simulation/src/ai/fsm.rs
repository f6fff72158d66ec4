//! Herder FSM
//!
//! Search → Sneak → Threat → Friend, без памяти:
//! следующий state зависит только от дистанции до выбранной цели на этом тике.
//! Hysteresis нет: дрожание на границе порога допустимо.

use bevy::prelude::*;

use crate::config::HerderConfig;

/// Поведенческие состояния herder'а
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum HerderState {
    /// Нет eligible цели (начальное состояние)
    #[default]
    Search,
    /// Цель видна, но далеко: медленное приближение
    Sneak,
    /// Цель на средней дистанции: активный herding
    Threat,
    /// Цель вплотную: ведём к safe zone
    Friend,
}

impl HerderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HerderState::Search => "Search",
            HerderState::Sneak => "Sneak",
            HerderState::Threat => "Threat",
            HerderState::Friend => "Friend",
        }
    }
}

/// Классификация по дистанции до цели (`None`: цели нет)
///
/// - `d ≤ close` → Friend
/// - `close < d ≤ mid` → Threat
/// - `d > mid` → Sneak
///
/// Нечисловая дистанция трактуется как отсутствие измерения.
pub fn classify(distance: Option<f32>, config: &HerderConfig) -> HerderState {
    match distance {
        None => HerderState::Search,
        Some(d) if !d.is_finite() => HerderState::Search,
        Some(d) if d <= config.close_threshold => HerderState::Friend,
        Some(d) if d <= config.mid_threshold => HerderState::Threat,
        Some(_) => HerderState::Sneak,
    }
}
