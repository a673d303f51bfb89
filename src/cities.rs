use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::heightmap::Heightmap;
use crate::rivers::RiverPath;
use crate::rng::Lcg;

/// Допустимые высоты под город: не вода и не горы
pub const CITY_BAND: RangeInclusive<f32> = 0.3..=0.7;
/// Радиус квадрата, в котором ищется река
pub const RIVER_PROXIMITY_RADIUS: i64 = 3;
/// Вероятность отбросить кандидата вдали от реки
pub const INLAND_REJECTION: f64 = 0.7;
/// Бюджет попыток на один запрошенный город
pub const ATTEMPTS_PER_CITY: u32 = 10;

const RIVERSIDE_BONUS: f64 = 1.0;
const IDEAL_TERRAIN_BONUS: f64 = 0.5;

/// Поселение на сетке. `size` растёт у рек и на ровных высотах
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub x: u32,
    pub y: u32,
    pub size: f32,
}

impl City {
    pub fn distance_to(&self, x: u32, y: u32) -> f64 {
        let dx = f64::from(self.x) - f64::from(x);
        let dy = f64::from(self.y) - f64::from(y);
        dx.hypot(dy)
    }
}

/// Множество клеток, занятых реками
struct RiverCells<'a> {
    heightmap: &'a Heightmap,
    cells: HashSet<usize>,
}

impl<'a> RiverCells<'a> {
    fn new(heightmap: &'a Heightmap, rivers: &[RiverPath]) -> Self {
        let cells = rivers
            .iter()
            .flat_map(|r| r.points.iter().copied())
            .collect();
        Self { heightmap, cells }
    }

    fn is_near(&self, x: u32, y: u32, radius: i64) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        let (x, y) = (i64::from(x), i64::from(y));
        (-radius..=radius).any(|dy| {
            (-radius..=radius).any(|dx| {
                self.heightmap
                    .checked_index(x + dx, y + dy)
                    .is_some_and(|idx| self.cells.contains(&idx))
            })
        })
    }
}

fn is_ideal_terrain(h: f32) -> bool {
    h > 0.4 && h < 0.6
}

/// Расставляет до `city_count` городов выборкой с отклонением
///
/// Города не ближе `width / 10` друг к другу. Бюджет попыток равен
/// `city_count * 10`; если он исчерпан, возвращается сколько успели поставить.
pub fn place_cities(
    heightmap: &Heightmap,
    rivers: &[RiverPath],
    seed: u32,
    city_count: u32,
) -> Vec<City> {
    let mut cities: Vec<City> = Vec::new();
    // Ни одной подходящей клетки: выборка заведомо пуста, бюджет не тратим
    if !heightmap.data.iter().any(|h| CITY_BAND.contains(h)) {
        return cities;
    }

    let river_cells = RiverCells::new(heightmap, rivers);
    let min_spacing = f64::from(heightmap.width) / 10.0;
    let budget = city_count.saturating_mul(ATTEMPTS_PER_CITY);
    let mut rng = Lcg::new(seed);

    let mut rejected_terrain = 0u32;
    let mut rejected_inland = 0u32;
    let mut rejected_crowded = 0u32;

    for _ in 0..budget {
        if cities.len() >= city_count as usize {
            break;
        }

        let x = rng.below(heightmap.width);
        let y = rng.below(heightmap.height);
        let h = heightmap.get(x, y);
        if !CITY_BAND.contains(&h) {
            rejected_terrain += 1;
            continue;
        }

        // Вдали от реки кандидат выживает лишь в 30% случаев
        let riverside = river_cells.is_near(x, y, RIVER_PROXIMITY_RADIUS);
        if !riverside && rng.next_f64() < INLAND_REJECTION {
            rejected_inland += 1;
            continue;
        }

        if cities.iter().any(|c| c.distance_to(x, y) < min_spacing) {
            rejected_crowded += 1;
            continue;
        }

        let mut size = rng.range_f64(1.0, 3.0);
        if riverside {
            size += RIVERSIDE_BONUS;
        }
        if is_ideal_terrain(h) {
            size += IDEAL_TERRAIN_BONUS;
        }
        cities.push(City {
            x,
            y,
            size: size as f32,
        });
    }

    tracing::debug!(
        target: "terramap::cities",
        requested = city_count,
        placed = cities.len(),
        budget,
        rejected_terrain,
        rejected_inland,
        rejected_crowded,
        "cities.placed"
    );

    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(width: u32, height: u32, value: f32) -> Heightmap {
        Heightmap {
            width,
            height,
            data: vec![value; (width * height) as usize],
        }
    }

    #[test]
    fn river_proximity_uses_square_radius() {
        let map = flat(20, 20, 0.5);
        let river = RiverPath {
            points: vec![map.index(5, 5)],
        };
        let cells = RiverCells::new(&map, std::slice::from_ref(&river));

        assert!(cells.is_near(8, 8, RIVER_PROXIMITY_RADIUS));
        assert!(cells.is_near(2, 5, RIVER_PROXIMITY_RADIUS));
        assert!(!cells.is_near(9, 5, RIVER_PROXIMITY_RADIUS));
        assert!(!cells.is_near(5, 1, RIVER_PROXIMITY_RADIUS));
    }

    #[test]
    fn unsuitable_terrain_gets_no_cities() {
        for value in [0.1, 0.95] {
            let map = flat(30, 30, value);
            assert!(place_cities(&map, &[], 4, 10).is_empty());
        }
    }

    #[test]
    fn huge_request_on_unsuitable_terrain_is_empty() {
        let map = flat(10, 10, 0.1);
        assert!(place_cities(&map, &[], 1, u32::MAX).is_empty());
    }

    #[test]
    fn huge_request_is_bounded_by_the_grid() {
        let map = flat(10, 10, 0.5);
        let cities = place_cities(&map, &[], 1, 1_000);
        assert!(!cities.is_empty());
        assert!(cities.len() <= 100);
    }

    #[test]
    fn zero_requested_is_empty() {
        let map = flat(30, 30, 0.5);
        assert!(place_cities(&map, &[], 4, 0).is_empty());
    }

    #[test]
    fn inland_cities_on_ideal_ground() {
        let map = flat(100, 100, 0.5);
        let cities = place_cities(&map, &[], 21, 12);

        assert!(!cities.is_empty());
        assert!(cities.len() <= 12);
        for city in &cities {
            assert!((1.5..=3.5).contains(&city.size), "size {}", city.size);
        }
    }

    #[test]
    fn riverside_cities_get_bonus() {
        let map = flat(40, 40, 0.65);
        let river = RiverPath {
            points: (0..map.data.len()).collect(),
        };
        let cities = place_cities(&map, &[river], 5, 6);

        assert!(!cities.is_empty());
        for city in &cities {
            assert!((2.0..=4.0).contains(&city.size), "size {}", city.size);
        }
    }

    #[test]
    fn cities_keep_their_distance() {
        let map = flat(50, 50, 0.5);
        let cities = place_cities(&map, &[], 77, 40);
        let min_spacing = 50.0 / 10.0;

        for (i, a) in cities.iter().enumerate() {
            for b in &cities[i + 1..] {
                assert!(a.distance_to(b.x, b.y) >= min_spacing);
            }
        }
    }

    #[test]
    fn placement_is_reproducible() {
        let map = crate::heightmap::synthesize(64, 64, 31, 24.0, 4, 0.5, 2.0);
        let rivers = crate::rivers::trace_rivers(&map, 31, 6, 2);
        let a = place_cities(&map, &rivers, 31, 8);
        let b = place_cities(&map, &rivers, 31, 8);
        assert_eq!(a, b);
    }
}
