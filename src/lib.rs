pub mod cities;
pub mod config;
pub mod error;
pub mod heightmap;
pub mod pipeline;
pub mod render;
pub mod rivers;
pub mod rng;

pub use cities::{City, place_cities};
pub use config::GenerationParams;
pub use error::{MapgenError, Result};
pub use heightmap::{Heightmap, synthesize};
pub use pipeline::{GenerationResult, generate};
pub use rivers::{RiverPath, trace_rivers};
pub use rng::Lcg;
