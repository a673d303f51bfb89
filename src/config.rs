// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет параметры, управляющие процедурной генерацией:
//! - Размер сетки и сид
//! - Форму шума (масштаб, октавы, persistence, lacunarity)
//! - Целевое количество рек и городов
//!
//! Все поля имеют значения по умолчанию, поэтому TOML-файл может задавать только часть из них.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MapgenError, Result};

/// Масштаб, который подставляется вместо неположительного
pub const MIN_SCALE: f64 = 1e-4;

/// Параметры одной генерации
///
/// Одинаковый сид и одинаковые параметры всегда дают одинаковый результат.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Сид генератора случайных чисел
    #[serde(default)]
    pub seed: u32,

    /// Ширина сетки в клетках (по умолчанию 512)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота сетки в клетках (по умолчанию 512)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Масштаб шума: чем больше, тем крупнее формы рельефа
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Количество слоёв шума
    #[serde(default = "default_octaves")]
    pub octaves: u32,

    /// Затухание амплитуды на каждой октаве
    #[serde(default = "default_persistence")]
    pub persistence: f64,

    /// Рост частоты на каждой октаве
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f64,

    /// Сколько попыток провести реку
    #[serde(default = "default_river_count")]
    pub river_count: u32,

    /// Реки короче этого числа точек отбрасываются целиком
    #[serde(default = "default_min_river_length")]
    pub min_river_length: u32,

    /// Сколько городов пытаемся разместить
    #[serde(default = "default_city_count")]
    pub city_count: u32,
}

fn default_width() -> u32 {
    512
}
fn default_height() -> u32 {
    512
}
fn default_scale() -> f64 {
    100.0
}
fn default_octaves() -> u32 {
    6
}
fn default_persistence() -> f64 {
    0.5
}
fn default_lacunarity() -> f64 {
    2.0
}
fn default_river_count() -> u32 {
    20
}
fn default_min_river_length() -> u32 {
    10
}
fn default_city_count() -> u32 {
    15
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: default_width(),
            height: default_height(),
            scale: default_scale(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            river_count: default_river_count(),
            min_river_length: default_min_river_length(),
            city_count: default_city_count(),
        }
    }
}

impl GenerationParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// seed = 42
    /// width = 256
    /// height = 256
    /// river_count = 8
    /// ```
    ///
    /// ```no_run
    /// use terramap::GenerationParams;
    /// let params = GenerationParams::from_toml_file("map.toml")?;
    /// # Ok::<(), terramap::MapgenError>(())
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Разбирает параметры из строки в формате TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let params: Self = toml::from_str(contents)?;
        Ok(params)
    }

    /// Масштаб шума, гарантированно положительный
    ///
    /// ```
    /// use terramap::config::{GenerationParams, MIN_SCALE};
    /// let params = GenerationParams { scale: -3.0, ..Default::default() };
    /// assert_eq!(params.sanitized_scale(), MIN_SCALE);
    /// ```
    #[must_use]
    pub fn sanitized_scale(&self) -> f64 {
        sanitize_scale(self.scale)
    }

    /// Проверяет параметры до запуска генерации.
    ///
    /// Сами алгоритмы генерации эту проверку не вызывают: нулевой размер сетки
    /// для них просто означает пустой результат.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapgenError::InvalidParameter(format!(
                "grid must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.octaves == 0 {
            return Err(MapgenError::InvalidParameter(
                "octaves must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("scale", self.scale),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !value.is_finite() {
                return Err(MapgenError::InvalidParameter(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        // Амплитуда и частота последней октавы тоже должны оставаться конечными
        let last_octave = i32::try_from(self.octaves - 1).unwrap_or(i32::MAX);
        for (name, value) in [
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !value.powi(last_octave).is_finite() {
                return Err(MapgenError::InvalidParameter(format!(
                    "{name} = {value} overflows over {} octaves",
                    self.octaves
                )));
            }
        }
        Ok(())
    }
}

/// Поднимает неположительный (или нечисловой) масштаб до [`MIN_SCALE`];
/// любой конечный положительный масштаб остаётся как есть
#[must_use]
pub fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        MIN_SCALE
    }
}
