//! Общий тип ошибок для загрузки конфигурации, проверки параметров и экспорта.
//!
//! Сама генерация не падает: неудачный рельеф даёт лишь меньше рек или городов.
//! Ошибки возникают только на границе крейта.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapgenError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("pixel buffer does not match image dimensions")]
    ImageBuffer,
}

pub type Result<T> = std::result::Result<T, MapgenError>;
