//! Composition of the two resolver stages.
//!
//! A caller-facing facade over the geocoding and weather clients: one
//! shared cache handle, one entry point, one freshness query.

use cache::TtlCache;
use common::{AppConfig, Error, Forecast, Result};
use geocode_client::GeocodeClient;
use nws_client::ForecastClient;
use tracing::debug;

/// The full address-to-forecast pipeline.
///
/// Both resolvers share one cache handle; each owns its namespace.
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    geocode: GeocodeClient,
    forecast: ForecastClient,
}

impl ForecastPipeline {
    pub fn new(cache: TtlCache, config: &AppConfig) -> Self {
        Self {
            geocode: GeocodeClient::new(cache.clone(), config),
            forecast: ForecastClient::new(cache, config),
        }
    }

    /// Resolve an address or zip to a forecast: geocode first, then the
    /// two-hop weather lookup on the resulting coordinate.
    ///
    /// An address the provider cannot geocode leaves the weather stage
    /// without its mandatory arguments, which is an `InvalidArgument`
    /// outcome for the whole pipeline.
    pub async fn resolve_forecast(&self, address: &str, zip_code: Option<&str>) -> Result<Forecast> {
        let Some(coordinate) = self.geocode.resolve(address, zip_code).await? else {
            return Err(Error::InvalidArgument(format!(
                "address could not be geocoded: {address:?}"
            )));
        };

        debug!(
            "geocoded {:?} to ({}, {})",
            address,
            coordinate.latitude(),
            coordinate.longitude()
        );

        self.forecast
            .resolve(coordinate.latitude(), coordinate.longitude(), coordinate.zip_code())
            .await
    }

    /// Remaining freshness of the forecast cached for a zip, in seconds.
    ///
    /// Call after [`resolve_forecast`](Self::resolve_forecast); before
    /// the forecast cache write the absent sentinel comes back, and a
    /// freshness directive built from it would mislead.
    pub fn remaining_ttl_for(&self, zip_code: &str) -> i64 {
        self.forecast.remaining_ttl(zip_code)
    }
}
