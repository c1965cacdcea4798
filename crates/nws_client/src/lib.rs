//! National Weather Service client for the forecast pipeline.
//!
//! Two-hop lookup: point metadata for a coordinate, then the hourly
//! forecast URL that metadata links to. Parsed forecasts are cached per
//! zip, and the remaining cache lifetime doubles as response freshness.

use cache::TtlCache;
use common::types::fixed4;
use common::{AppConfig, Error, Forecast, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Cache namespace for resolved forecasts.
const CACHE_NAMESPACE: &str = "forecast";

// ── NWS response types ────────────────────────────────────────────────

/// Point metadata from `/points/{lat},{lon}`.
#[derive(Debug, Deserialize)]
pub struct PointResponse {
    pub properties: PointProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointProperties {
    /// Where the hourly forecast for this gridpoint lives. Discovered
    /// dynamically from the first hop, never constructed.
    #[serde(rename = "forecastHourly")]
    pub forecast_hourly: String,
}

/// Hourly forecast response: an ordered sequence of periods, the first
/// aligned to the current hour.
#[derive(Debug, Deserialize)]
pub struct HourlyResponse {
    pub properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
pub struct HourlyProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastPeriod {
    /// Arrives as either a bare number or a numeric string.
    pub temperature: serde_json::Value,
}

// ── Implementation ────────────────────────────────────────────────────

/// Async client for the weather provider.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    cache: TtlCache,
    base_url: String,
    ttl_secs: u64,
}

impl ForecastClient {
    pub fn new(cache: TtlCache, config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build weather HTTP client");

        Self {
            client,
            cache,
            base_url: config.nws_url.trim_end_matches('/').to_string(),
            ttl_secs: config.cache_ttl_secs,
        }
    }

    /// Resolve a coordinate to a forecast.
    ///
    /// All three inputs are mandatory: the cache key needs the zip and
    /// the outbound request needs both coordinates. Provider failures on
    /// either hop degrade to a zip-only forecast rather than an error,
    /// and nothing is cached until a response chain fully succeeds.
    pub async fn resolve(&self, latitude: &str, longitude: &str, zip_code: &str) -> Result<Forecast> {
        if latitude.trim().is_empty() || longitude.trim().is_empty() || zip_code.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "cannot resolve a forecast with blank arguments".into(),
            ));
        }

        let latitude = fixed4(latitude)?;
        let longitude = fixed4(longitude)?;
        let key = cache_key(zip_code);

        if let Some(cached) = self.cache.get(&key) {
            debug!("forecast cache hit for {}", zip_code);
            return Ok(serde_json::from_str(&cached)?);
        }

        let point_url = format!("{}/points/{},{}", self.base_url, latitude, longitude);
        let Some(point) = self.fetch_json::<PointResponse>(&point_url, zip_code).await? else {
            return Ok(Forecast::empty(zip_code));
        };

        let hourly_url = point.properties.forecast_hourly;
        let Some(hourly) = self.fetch_json::<HourlyResponse>(&hourly_url, zip_code).await? else {
            return Ok(Forecast::empty(zip_code));
        };

        let forecast = aggregate(zip_code, &hourly.properties.periods)?;
        self.cache.set(&key, serde_json::to_string(&forecast)?, self.ttl_secs);

        info!("providing a newly cached forecast for {}", zip_code);
        Ok(forecast)
    }

    /// Remaining lifetime of the cached forecast for a zip, in seconds.
    ///
    /// Only meaningful after [`resolve`](Self::resolve) has run for this
    /// zip in the same request; before the write it reports the absent
    /// sentinel ([`cache::TTL_ABSENT`]).
    pub fn remaining_ttl(&self, zip_code: &str) -> i64 {
        self.cache.ttl(&cache_key(zip_code))
    }

    /// GET a provider URL and parse the body. A non-success status is
    /// logged and collapses to `None`; a malformed body on a success
    /// status is a fault and propagates.
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        zip_code: &str,
    ) -> Result<Option<T>> {
        debug!("fetching {}", url);
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/geo+json")
            .send()
            .await
            .map_err(|e| Error::Nws(format!("HTTP error for {zip_code}: {e}")))?;

        if !resp.status().is_success() {
            warn!("weather provider returned {} for {}", resp.status(), zip_code);
            return Ok(None);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Nws(format!("body read error for {zip_code}: {e}")))?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

/// Fold the ordered periods into a forecast: the first period carries the
/// current temperature, and high/low are the running max/min across all
/// periods. Ties keep the first value seen.
fn aggregate(zip_code: &str, periods: &[ForecastPeriod]) -> Result<Forecast> {
    if periods.is_empty() {
        return Err(Error::Nws(format!(
            "hourly response for {zip_code} contained no forecast periods"
        )));
    }

    let mut forecast = Forecast::empty(zip_code);
    for period in periods {
        let temperature = parse_temperature(&period.temperature)?;

        if forecast.current_temperature.is_none() {
            forecast.current_temperature = Some(temperature);
        }
        match forecast.day_ahead_high {
            Some(high) if high >= temperature => {}
            _ => forecast.day_ahead_high = Some(temperature),
        }
        match forecast.day_ahead_low {
            Some(low) if low <= temperature => {}
            _ => forecast.day_ahead_low = Some(temperature),
        }
    }

    Ok(forecast)
}

/// Provider temperatures arrive as strings or bare numbers; both parse
/// into exact decimals. `f64` never touches a temperature.
fn parse_temperature(raw: &serde_json::Value) -> Result<Decimal> {
    let parsed = match raw {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::Nws(format!("unparseable temperature value: {raw}")))
}

fn cache_key(zip: &str) -> String {
    format!("{CACHE_NAMESPACE}:{zip}")
}
