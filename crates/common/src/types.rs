//! Domain types shared across the pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Format a decimal string to exactly four decimal places.
///
/// Coordinates stay strings end to end; normalizing once keeps the
/// outbound request path identical across cache writes and reads, with
/// no binary-float representation drift.
pub fn fixed4(raw: &str) -> Result<String> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| Error::InvalidArgument(format!("not a decimal value: {raw:?}")))?;
    Ok(format!("{value:.4}"))
}

/// A geocoded location: latitude and longitude as fixed four-decimal
/// strings, paired with the zip code that keys both cache namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    latitude: String,
    longitude: String,
    zip_code: String,
}

impl Coordinate {
    /// Build from provider-supplied decimal strings, normalizing both
    /// coordinates to four decimal places.
    pub fn new(latitude: &str, longitude: &str, zip_code: &str) -> Result<Self> {
        Ok(Self {
            latitude: fixed4(latitude)?,
            longitude: fixed4(longitude)?,
            zip_code: zip_code.to_string(),
        })
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

/// Weather forecast for a zip code.
///
/// Temperature fields are `None` until populated by a successful lookup;
/// a `None` serializes as an absent field, never a numeric stand-in, and
/// deserializes back to `None`. The zip code is fixed at construction.
/// Equality is structural over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    zip_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_ahead_high: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_ahead_low: Option<Decimal>,
}

impl Forecast {
    /// A forecast that knows its location but no temperatures yet.
    pub fn empty(zip_code: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            current_temperature: None,
            day_ahead_high: None,
            day_ahead_low: None,
        }
    }

    /// A fully populated forecast.
    pub fn new(
        zip_code: impl Into<String>,
        current_temperature: Decimal,
        day_ahead_high: Decimal,
        day_ahead_low: Decimal,
    ) -> Self {
        Self {
            zip_code: zip_code.into(),
            current_temperature: Some(current_temperature),
            day_ahead_high: Some(day_ahead_high),
            day_ahead_low: Some(day_ahead_low),
        }
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    /// True once every temperature field has been populated.
    pub fn is_complete(&self) -> bool {
        self.current_temperature.is_some()
            && self.day_ahead_high.is_some()
            && self.day_ahead_low.is_some()
    }
}
