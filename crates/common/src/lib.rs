//! Shared types, config, and error definitions for zipcast.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use types::{Coordinate, Forecast};

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
