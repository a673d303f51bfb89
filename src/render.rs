//! Отрисовка результата генерации в RGBA-изображение
//!
//! Рельеф раскрашивается по полосам высот, поверх рисуются реки (ломаные
//! по центрам клеток) и города (круги, радиус зависит от размера города).
//! Результат генерации при этом не меняется.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::GenerationResult;

pub const RIVER_COLOR: [u8; 4] = [40, 90, 200, 255];
pub const CITY_FILL: [u8; 4] = [200, 40, 40, 255];
pub const CITY_OUTLINE: [u8; 4] = [30, 30, 30, 255];

/// Полоса высот для раскраски рельефа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainBand {
    DeepWater,
    ShallowWater,
    Beach,
    Lowland,
    Highland,
    Mountain,
    Snow,
}

impl TerrainBand {
    #[must_use]
    pub fn classify(height: f32) -> Self {
        if height < 0.2 {
            TerrainBand::DeepWater
        } else if height < 0.3 {
            TerrainBand::ShallowWater
        } else if height < 0.35 {
            TerrainBand::Beach
        } else if height < 0.6 {
            TerrainBand::Lowland
        } else if height < 0.75 {
            TerrainBand::Highland
        } else if height < 0.9 {
            TerrainBand::Mountain
        } else {
            TerrainBand::Snow
        }
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            TerrainBand::DeepWater => [0, 64, 128],
            TerrainBand::ShallowWater => [40, 110, 170],
            TerrainBand::Beach => [220, 205, 150],
            TerrainBand::Lowland => [110, 170, 80],
            TerrainBand::Highland => [70, 125, 60],
            TerrainBand::Mountain => [130, 120, 110],
            TerrainBand::Snow => [240, 240, 245],
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Сколько пикселей изображения приходится на клетку по каждой оси
    pub pixel_scale: u32,
    pub draw_rivers: bool,
    pub draw_cities: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pixel_scale: 2,
            draw_rivers: true,
            draw_cities: true,
        }
    }
}

/// Рисует карту: рельеф, затем реки, затем города
#[must_use]
pub fn render_map(result: &GenerationResult, options: &RenderOptions) -> RgbaImage {
    let heightmap = &result.heightmap;
    let scale = options.pixel_scale.max(1);

    let mut img = RgbaImage::from_fn(heightmap.width * scale, heightmap.height * scale, |px, py| {
        let [r, g, b] = TerrainBand::classify(heightmap.get(px / scale, py / scale)).to_rgb();
        Rgba([r, g, b, 255])
    });

    if options.draw_rivers {
        for river in &result.rivers {
            let points: Vec<(f32, f32)> = river
                .coords(heightmap.width)
                .map(|(x, y)| cell_center(x, y, scale))
                .collect();

            if let [single] = points.as_slice() {
                draw_line_segment_mut(&mut img, *single, *single, Rgba(RIVER_COLOR));
            }
            for segment in points.windows(2) {
                draw_line_segment_mut(&mut img, segment[0], segment[1], Rgba(RIVER_COLOR));
            }
        }
    }

    if options.draw_cities {
        for city in &result.cities {
            let (cx, cy) = cell_center(city.x, city.y, scale);
            let center = (cx as i32, cy as i32);
            let radius = ((city.size * scale as f32).round() as i32).max(1);

            draw_filled_circle_mut(&mut img, center, radius, Rgba(CITY_FILL));
            draw_hollow_circle_mut(&mut img, center, radius + 1, Rgba(CITY_OUTLINE));
        }
    }

    img
}

pub fn save_png(img: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    img.save(path)?;
    Ok(())
}

fn cell_center(x: u32, y: u32, scale: u32) -> (f32, f32) {
    let half = (scale / 2) as f32;
    ((x * scale) as f32 + half, (y * scale) as f32 + half)
}
