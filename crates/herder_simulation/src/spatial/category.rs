//! Категории сущностей арены
//!
//! ## Архитектура:
//! - **Category:** кем является сущность (назначается при spawn)
//! - **CategoryMask (битовая маска):** какие категории интересуют запрос
//!
//! ## Слои:
//! - Bit 0 (0b1 = 1): Prey (цели herder'а)
//! - Bit 1 (0b10 = 2): SafeZone (landmark цели herding'а)
//! - Bit 2 (0b100 = 4): Obstacle (препятствия внутри арены)
//! - Bit 3 (0b1000 = 8): Boundary (стены арены)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Category {
    Prey,
    SafeZone,
    Obstacle,
    Boundary,
}

impl Category {
    pub const fn bits(self) -> u32 {
        match self {
            Category::Prey => 0b1,
            Category::SafeZone => 0b10,
            Category::Obstacle => 0b100,
            Category::Boundary => 0b1000,
        }
    }

    /// Блокирует ли категория движение (контакт → bounce) и line of sight
    pub const fn is_blocking(self) -> bool {
        matches!(self, Category::Obstacle | Category::Boundary)
    }

    /// Название для debug логов
    pub const fn name(self) -> &'static str {
        match self {
            Category::Prey => "Prey",
            Category::SafeZone => "SafeZone",
            Category::Obstacle => "Obstacle",
            Category::Boundary => "Boundary",
        }
    }
}

/// Набор категорий (фильтр запроса)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    pub const NONE: Self = Self(0);

    /// Mask: цели perception
    pub const TARGETS: Self = Self(Category::Prey.bits());

    /// Mask: line-of-sight occlusion (Obstacle + Boundary)
    pub const OCCLUDERS: Self = Self(Category::Obstacle.bits() | Category::Boundary.bits());

    pub const fn contains(self, category: Category) -> bool {
        self.0 & category.bits() != 0
    }

    pub const fn with(self, category: Category) -> Self {
        Self(self.0 | category.bits())
    }
}

impl From<Category> for CategoryMask {
    fn from(category: Category) -> Self {
        Self(category.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_distinct() {
        let all = [
            Category::Prey,
            Category::SafeZone,
            Category::Obstacle,
            Category::Boundary,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_eq!(a.bits() & b.bits(), 0, "{} overlaps {}", a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_occluder_mask() {
        assert!(CategoryMask::OCCLUDERS.contains(Category::Obstacle));
        assert!(CategoryMask::OCCLUDERS.contains(Category::Boundary));
        assert!(!CategoryMask::OCCLUDERS.contains(Category::Prey));
        assert!(!CategoryMask::OCCLUDERS.contains(Category::SafeZone));
    }

    #[test]
    fn test_mask_builder() {
        let mask = CategoryMask::NONE.with(Category::Prey).with(Category::SafeZone);
        assert!(mask.contains(Category::Prey));
        assert!(mask.contains(Category::SafeZone));
        assert!(!mask.contains(Category::Boundary));
        assert_eq!(CategoryMask::from(Category::Prey), CategoryMask::TARGETS);
    }

    #[test]
    fn test_blocking_categories() {
        assert!(Category::Obstacle.is_blocking());
        assert!(Category::Boundary.is_blocking());
        assert!(!Category::Prey.is_blocking());
        assert!(!Category::SafeZone.is_blocking());
    }
}
