use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use image::{ImageBuffer, Luma};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::sanitize_scale;
use crate::error::{MapgenError, Result};
use crate::rng::Lcg;

/// Смещения октав берутся из диапазона [0, 100000), чтобы слои не совпадали
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

/// Двумерная карта высот: значения от 0.0 (низины) до 1.0 (вершины), построчно
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heightmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Heightmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((idx % width) as u32, (idx / width) as u32)
    }

    /// Индекс клетки по знаковым координатам, `None` за краем карты
    #[inline]
    pub fn checked_index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(self.index(x as u32, y as u32))
    }

    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<f32> {
        self.checked_index(x, y).map(|idx| self.data[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_grayscale_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect()
    }

    pub fn save_as_png(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image())
                .ok_or(MapgenError::ImageBuffer)?;
        img.save(path)?;
        Ok(())
    }
}

/// Многооктавный шум: один сэмплер, у каждой октавы своё смещение
struct OctaveSampler {
    noise: FastNoiseLite,
    offsets: Vec<(f64, f64)>,
    scale: f64,
    persistence: f64,
    lacunarity: f64,
}

impl OctaveSampler {
    fn new(rng: &mut Lcg, scale: f64, octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        // Первое число потока задаёт сам шум, а не только смещения
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(rng.next_u32() as i32));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::None));
        noise.set_frequency(Some(1.0));

        let offsets = (0..octaves)
            .map(|_| {
                let ox = rng.next_f64() * OCTAVE_OFFSET_RANGE;
                let oy = rng.next_f64() * OCTAVE_OFFSET_RANGE;
                (ox, oy)
            })
            .collect();

        Self {
            noise,
            offsets,
            scale,
            persistence,
            lacunarity,
        }
    }

    fn sample(&self, x: f64, y: f64) -> f64 {
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut value = 0.0;

        for &(ox, oy) in &self.offsets {
            let sx = (x / self.scale) * frequency + ox;
            let sy = (y / self.scale) * frequency + oy;
            value += f64::from(self.noise.get_noise_2d(sx, sy)) * amplitude;

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }
        value
    }
}

/// Генерирует карту высот, нормализованную в [0, 1]
///
/// Неположительный `scale` поднимается до [`crate::config::MIN_SCALE`].
/// Если все сырые значения равны, карта целиком нулевая.
pub fn synthesize(
    width: u32,
    height: u32,
    seed: u32,
    scale: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> Heightmap {
    let scale = sanitize_scale(scale);
    let mut rng = Lcg::new(seed);
    let sampler = OctaveSampler::new(&mut rng, scale, octaves, persistence, lacunarity);

    // === 1. Сырой шум ===
    let raw = sample_raw(&sampler, width, height);

    // === 2. Нормализация ===
    let (min_h, max_h) = raw
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max_h - min_h;

    // Переполнение амплитуды даёт ±inf/NaN: такую карту считаем плоской
    let finite = raw.is_empty() || (range.is_finite() && raw.iter().all(|v| v.is_finite()));
    if !finite {
        tracing::warn!(
            target: "terramap::heightmap",
            persistence,
            lacunarity,
            octaves,
            "heightmap.non_finite_noise"
        );
    }

    let data = if finite && range > 0.0 {
        raw.iter().map(|&v| ((v - min_h) / range) as f32).collect()
    } else {
        vec![0.0; raw.len()]
    };

    tracing::debug!(
        target: "terramap::heightmap",
        width,
        height,
        octaves,
        scale,
        raw_min = min_h,
        raw_max = max_h,
        "heightmap.synthesized"
    );

    Heightmap {
        width,
        height,
        data,
    }
}

fn sample_raw(sampler: &OctaveSampler, width: u32, height: u32) -> Vec<f64> {
    let w = width as usize;
    let total = w * height as usize;
    let cell = |i: usize| sampler.sample((i % w) as f64, (i / w) as f64);

    #[cfg(feature = "parallel")]
    {
        (0..total).into_par_iter().map(cell).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..total).map(cell).collect()
    }
}
