//! Сборка полной карты: шум → реки → города
//!
//! Каждая фаза получает собственный генератор, засеянный одним и тем же сидом,
//! и начинается только после того, как предыдущая полностью закончила работу.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cities::{City, place_cities};
use crate::config::GenerationParams;
use crate::error::Result;
use crate::heightmap::{Heightmap, synthesize};
use crate::rivers::{RiverPath, trace_rivers};

/// Результат генерации, который получает слой отрисовки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub heightmap: Heightmap,
    pub rivers: Vec<RiverPath>,
    pub cities: Vec<City>,
}

impl GenerationResult {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Генерирует карту высот, реки и города по параметрам
#[must_use]
pub fn generate(params: &GenerationParams) -> GenerationResult {
    let heightmap = synthesize(
        params.width,
        params.height,
        params.seed,
        params.scale,
        params.octaves,
        params.persistence,
        params.lacunarity,
    );
    let rivers = trace_rivers(
        &heightmap,
        params.seed,
        params.river_count,
        params.min_river_length,
    );
    let cities = place_cities(&heightmap, &rivers, params.seed, params.city_count);

    tracing::info!(
        target: "terramap::pipeline",
        seed = params.seed,
        width = params.width,
        height = params.height,
        rivers = rivers.len(),
        cities = cities.len(),
        "map.generated"
    );

    GenerationResult {
        heightmap,
        rivers,
        cities,
    }
}
