use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::heightmap::Heightmap;
use crate::rng::Lcg;

/// Допустимые высоты истока реки
pub const SOURCE_BAND: RangeInclusive<f32> = 0.6..=0.8;
/// Сколько случайных точек пробуем на роль истока
pub const SOURCE_ATTEMPTS: u32 = 100;
/// Предел длины одной реки
pub const MAX_RIVER_POINTS: usize = 1000;

/// Клетки за краем карты считаются вершинами и никогда не выбираются
const OUT_OF_BOUNDS_HEIGHT: f32 = 1.0;

// Порядок обхода соседей построчный: при равных высотах побеждает первый
const DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Одна река: индексы клеток от истока к устью, без повторов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiverPath {
    pub points: Vec<usize>,
}

impl RiverPath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn source(&self) -> Option<usize> {
        self.points.first().copied()
    }

    pub fn mouth(&self) -> Option<usize> {
        self.points.last().copied()
    }

    /// Координаты точек пути в сетке шириной `width`
    pub fn coords(&self, width: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = width as usize;
        self.points
            .iter()
            .map(move |&idx| ((idx % width) as u32, (idx / width) as u32))
    }
}

/// Прокладывает до `river_count` рек спуском по самому крутому склону
///
/// Попытка без подходящего истока или с рекой короче `min_river_length`
/// просто пропускается, поэтому рек может получиться меньше, чем запрошено.
pub fn trace_rivers(
    heightmap: &Heightmap,
    seed: u32,
    river_count: u32,
    min_river_length: u32,
) -> Vec<RiverPath> {
    let mut rivers = Vec::new();
    if !heightmap.data.iter().any(|h| SOURCE_BAND.contains(h)) {
        return rivers;
    }

    let mut rng = Lcg::new(seed);
    let mut no_source = 0u32;
    let mut too_short = 0u32;

    for _ in 0..river_count {
        let Some(start) = find_source(heightmap, &mut rng) else {
            no_source += 1;
            continue;
        };

        let points = walk_downhill(heightmap, start);
        if points.len() < min_river_length as usize {
            too_short += 1;
            continue;
        }
        rivers.push(RiverPath { points });
    }

    tracing::debug!(
        target: "terramap::rivers",
        attempts = river_count,
        kept = rivers.len(),
        no_source,
        too_short,
        "rivers.traced"
    );

    rivers
}

/// Случайный исток на средних высотах, не более [`SOURCE_ATTEMPTS`] проб
fn find_source(heightmap: &Heightmap, rng: &mut Lcg) -> Option<usize> {
    for _ in 0..SOURCE_ATTEMPTS {
        let x = rng.below(heightmap.width);
        let y = rng.below(heightmap.height);
        let idx = heightmap.index(x, y);
        if SOURCE_BAND.contains(&heightmap.data[idx]) {
            return Some(idx);
        }
    }
    None
}

/// Спуск от `start` к самому низкому соседу, пока он строго ниже текущей клетки
fn walk_downhill(heightmap: &Heightmap, start: usize) -> Vec<usize> {
    let mut path = vec![start];
    let mut visited = HashSet::from([start]);
    let mut current = start;

    while path.len() < MAX_RIVER_POINTS {
        let (x, y) = heightmap.coords(current);
        let (x, y) = (i64::from(x), i64::from(y));

        let mut lowest = heightmap.data[current];
        let mut step = None;
        for &(dx, dy) in &DIRECTIONS {
            let (nx, ny) = (x + dx, y + dy);
            let h = heightmap.get_checked(nx, ny).unwrap_or(OUT_OF_BOUNDS_HEIGHT);
            if h < lowest {
                lowest = h;
                step = Some((nx, ny));
            }
        }

        // Локальный минимум
        let Some((nx, ny)) = step else {
            break;
        };
        // Край карты: последняя точка остаётся внутри
        let Some(next) = heightmap.checked_index(nx, ny) else {
            break;
        };
        if !visited.insert(next) {
            break;
        }

        path.push(next);
        current = next;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: u32, height: u32, data: Vec<f32>) -> Heightmap {
        assert_eq!(data.len(), (width * height) as usize);
        Heightmap {
            width,
            height,
            data,
        }
    }

    #[test]
    fn walk_runs_into_the_bowl() {
        // Чаша 5×5: высота растёт с удалением от центра
        let mut data = Vec::new();
        for y in 0..5i32 {
            for x in 0..5i32 {
                let d = ((x - 2).pow(2) + (y - 2).pow(2)) as f32;
                data.push(0.1 + d * 0.08);
            }
        }
        let map = field(5, 5, data);

        let path = walk_downhill(&map, map.index(0, 0));
        assert_eq!(path, vec![0, map.index(1, 1), map.index(2, 2)]);
    }

    #[test]
    fn flat_ground_does_not_move() {
        let map = field(4, 4, vec![0.7; 16]);
        assert_eq!(walk_downhill(&map, 5), vec![5]);
    }

    #[test]
    fn first_lowest_neighbour_wins_ties() {
        #[rustfmt::skip]
        let map = field(3, 3, vec![
            0.9, 0.2, 0.9,
            0.2, 0.7, 0.9,
            0.9, 0.9, 0.9,
        ]);
        let path = walk_downhill(&map, 4);
        assert_eq!(path, vec![4, 1]);
    }

    #[test]
    fn walk_stops_at_point_cap() {
        let width = 2000;
        let data = (0..width).map(|i| 0.8 - i as f32 * 0.0001).collect();
        let map = field(width, 1, data);

        let path = walk_downhill(&map, 0);
        assert_eq!(path.len(), MAX_RIVER_POINTS);
        assert_eq!(path.last(), Some(&(MAX_RIVER_POINTS - 1)));
    }

    #[test]
    fn no_source_terrain_gives_no_rivers() {
        let map = field(10, 10, vec![0.1; 100]);
        assert!(trace_rivers(&map, 1, 10, 0).is_empty());
        assert!(trace_rivers(&map, 1, u32::MAX, 0).is_empty());
    }

    #[test]
    fn short_rivers_are_discarded_whole() {
        let map = field(6, 6, vec![0.7; 36]);

        let rivers = trace_rivers(&map, 11, 5, 1);
        assert_eq!(rivers.len(), 5);
        assert!(rivers.iter().all(|r| r.len() == 1));

        assert!(trace_rivers(&map, 11, 5, 2).is_empty());
    }

    #[test]
    fn never_more_rivers_than_requested() {
        let map = crate::heightmap::synthesize(64, 64, 8, 16.0, 4, 0.5, 2.0);
        assert!(trace_rivers(&map, 8, 7, 0).len() <= 7);
    }

    #[test]
    fn path_coords_follow_row_major_layout() {
        let river = RiverPath {
            points: vec![0, 6, 13],
        };
        let coords: Vec<_> = river.coords(5).collect();
        assert_eq!(coords, vec![(0, 0), (1, 1), (3, 2)]);
        assert_eq!(river.source(), Some(0));
        assert_eq!(river.mouth(), Some(13));
    }
}
