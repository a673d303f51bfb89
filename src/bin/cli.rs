use clap::Parser;
use std::path::PathBuf;
use terramap::render::{RenderOptions, render_map, save_png};
use terramap::{GenerationParams, generate};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Генератор стилизованных карт: рельеф, реки и города
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Путь для сохранения карты (по умолчанию: ./map.png)
    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,

    /// Дополнительно сохранить карту высот в оттенках серого
    #[arg(long)]
    heightmap_output: Option<PathBuf>,

    /// Дополнительно сохранить результат генерации в JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Выбрать случайный сид (перекрывает --seed и конфиг)
    #[arg(long)]
    random_seed: bool,

    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    scale: Option<f64>,
    #[arg(long)]
    octaves: Option<u32>,
    #[arg(long)]
    persistence: Option<f64>,
    #[arg(long)]
    lacunarity: Option<f64>,
    /// Количество попыток провести реку
    #[arg(long)]
    rivers: Option<u32>,
    #[arg(long)]
    min_river_length: Option<u32>,
    /// Количество городов
    #[arg(long)]
    cities: Option<u32>,

    /// Пикселей на клетку сетки
    #[arg(long, default_value_t = 2)]
    pixel_scale: u32,
    #[arg(long)]
    no_rivers: bool,
    #[arg(long)]
    no_cities: bool,

    /// Уровень логирования (директива tracing, например `debug` или `terramap=trace`)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn params(&self) -> Result<GenerationParams, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => {
                info!("Загрузка конфигурации из {}", path.display());
                GenerationParams::from_toml_file(path)?
            }
            None => GenerationParams::default(),
        };

        macro_rules! apply {
            ($($field:ident = $arg:ident),* $(,)?) => {
                $(if let Some(value) = self.$arg { params.$field = value; })*
            };
        }
        apply!(
            seed = seed,
            width = width,
            height = height,
            scale = scale,
            octaves = octaves,
            persistence = persistence,
            lacunarity = lacunarity,
            river_count = rivers,
            min_river_length = min_river_length,
            city_count = cities,
        );

        if self.random_seed {
            params.seed = rand::random();
            info!("Случайный сид: {}", params.seed);
        }

        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = cli.params()?;

    info!(
        "Генерация карты (размер: {}×{}, сид: {})...",
        params.width, params.height, params.seed
    );
    let result = generate(&params);

    let options = RenderOptions {
        pixel_scale: cli.pixel_scale,
        draw_rivers: !cli.no_rivers,
        draw_cities: !cli.no_cities,
    };
    let img = render_map(&result, &options);

    info!("Сохранение карты в {}", cli.output.display());
    save_png(&img, &cli.output)?;

    if let Some(path) = &cli.heightmap_output {
        info!("Сохранение карты высот в {}", path.display());
        result.heightmap.save_as_png(path)?;
    }
    if let Some(path) = &cli.json {
        info!("Сохранение JSON в {}", path.display());
        result.save_json(path)?;
    }

    info!(
        rivers = result.rivers.len(),
        cities = result.cities.len(),
        "Готово!"
    );
    Ok(())
}
