//! Unified error type for the forecast pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no zip code supplied and none found in address")]
    MissingZip,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("geocoding provider error: {0}")]
    Geocode(String),

    #[error("weather provider error: {0}")]
    Nws(String),

    #[error("config error: {0}")]
    Config(String),
}
