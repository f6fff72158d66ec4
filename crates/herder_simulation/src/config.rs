//! Конфигурация herder'а и симуляции
//!
//! Все tunables имеют `Default`, загружаются из TOML (`#[serde(default)]`:
//! можно указывать только переопределяемые поля) и проходят `validate()`
//! до создания herder'а. Нарушения инвариантов: ошибка setup'а, значения
//! не клампятся.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ошибки конфигурации (отклоняются на инициализации)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error(
        "thresholds must satisfy close < mid < sight radius \
         (close = {close}, mid = {mid}, sight = {sight})"
    )]
    ThresholdOrder { close: f32, mid: f32, sight: f32 },

    #[error("{field} ({discount}) exceeds max speed ({max_speed})")]
    DiscountExceedsMaxSpeed {
        field: &'static str,
        discount: f32,
        max_speed: f32,
    },

    #[error(
        "sneak_speed_discount ({sneak}) must not be smaller than \
         herd_speed_discount ({herd})"
    )]
    DiscountOrder { herd: f32, sneak: f32 },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Правило выбора цели среди нескольких eligible кандидатов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Ближайший eligible кандидат
    #[default]
    Nearest,
    /// Legacy: первый eligible в порядке выдачи spatial query
    /// (порядок не гарантирован, результат зависит от backend'а)
    FirstFound,
}

/// Параметры herder'а
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct HerderConfig {
    /// Максимальная скорость (m/s)
    pub max_speed: f32,
    /// Радиус обнаружения целей (метры)
    pub sight_radius: f32,
    /// Дистанция ≤ close → Friend
    pub close_threshold: f32,
    /// close < дистанция ≤ mid → Threat, дальше → Sneak
    pub mid_threshold: f32,
    /// Скидка со скорости в Threat (активный herding)
    pub herd_speed_discount: f32,
    /// Скидка со скорости в Sneak (медленное приближение)
    pub sneak_speed_discount: f32,
    /// Насколько за целью (от safe zone) стоит stand-off точка
    pub standoff_distance: f32,
    /// Полуширина дуги случайного wander направления от forward (градусы)
    pub wander_arc_degrees: f32,
    /// Доля max_speed при wander
    pub wander_speed_fraction: f32,
    /// Лимит поворота (градусы в секунду)
    pub max_turn_rate_degrees: f32,
    pub selection: SelectionPolicy,
}

impl Default for HerderConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            sight_radius: 7.5,
            close_threshold: 1.5,
            mid_threshold: 6.0,
            herd_speed_discount: 1.0,
            sneak_speed_discount: 2.5,
            standoff_distance: 3.0,
            wander_arc_degrees: 180.0,
            wander_speed_fraction: 0.6,
            max_turn_rate_degrees: 360.0,
            selection: SelectionPolicy::Nearest,
        }
    }
}

impl HerderConfig {
    /// Проверяет инварианты конфигурации
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("max_speed", self.max_speed),
            ("sight_radius", self.sight_radius),
            ("close_threshold", self.close_threshold),
            ("mid_threshold", self.mid_threshold),
            ("herd_speed_discount", self.herd_speed_discount),
            ("sneak_speed_discount", self.sneak_speed_discount),
            ("standoff_distance", self.standoff_distance),
            ("wander_arc_degrees", self.wander_arc_degrees),
            ("wander_speed_fraction", self.wander_speed_fraction),
            ("max_turn_rate_degrees", self.max_turn_rate_degrees),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite {
                    field,
                    value: value as f64,
                });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(self.close_threshold < self.mid_threshold && self.mid_threshold < self.sight_radius) {
            return Err(ConfigError::ThresholdOrder {
                close: self.close_threshold,
                mid: self.mid_threshold,
                sight: self.sight_radius,
            });
        }

        for (field, discount) in [
            ("herd_speed_discount", self.herd_speed_discount),
            ("sneak_speed_discount", self.sneak_speed_discount),
        ] {
            if discount > self.max_speed {
                return Err(ConfigError::DiscountExceedsMaxSpeed {
                    field,
                    discount,
                    max_speed: self.max_speed,
                });
            }
        }

        // Sneak: медленное приближение, скидка не меньше чем в Threat
        if self.sneak_speed_discount < self.herd_speed_discount {
            return Err(ConfigError::DiscountOrder {
                herd: self.herd_speed_discount,
                sneak: self.sneak_speed_discount,
            });
        }

        if self.wander_arc_degrees > 180.0 {
            return Err(ConfigError::OutOfRange {
                field: "wander_arc_degrees",
                value: self.wander_arc_degrees,
                min: 0.0,
                max: 180.0,
            });
        }

        if self.wander_speed_fraction > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "wander_speed_fraction",
                value: self.wander_speed_fraction,
                min: 0.0,
                max: 1.0,
            });
        }

        if self.max_turn_rate_degrees <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "max_turn_rate_degrees",
                value: self.max_turn_rate_degrees as f64,
            });
        }

        Ok(())
    }

    /// Скорость в Threat state
    pub fn herd_speed(&self) -> f32 {
        self.max_speed - self.herd_speed_discount
    }

    /// Скорость в Sneak state
    pub fn sneak_speed(&self) -> f32 {
        self.max_speed - self.sneak_speed_discount
    }

    /// Скорость при wander
    pub fn wander_speed(&self) -> f32 {
        self.max_speed * self.wander_speed_fraction
    }

    /// Максимальный угол поворота за один fixed step (радианы)
    pub fn max_turn_per_step(&self, step_secs: f32) -> f32 {
        self.max_turn_rate_degrees.to_radians() * step_secs
    }
}

/// Конфигурация всей headless симуляции
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (physics cadence), Hz
    pub fixed_hz: f64,
    /// Seed для DeterministicRng
    pub seed: u64,
    pub herder: HerderConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 50.0, // 0.02s fixed step
            seed: 42,
            herder: HerderConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Загружает и валидирует конфигурацию из TOML файла
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Парсит и валидирует конфигурацию из TOML строки
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fixed_hz.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "fixed_hz",
                value: self.fixed_hz,
            });
        }
        if self.fixed_hz <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "fixed_hz",
                value: self.fixed_hz,
            });
        }
        self.herder.validate()
    }
}
