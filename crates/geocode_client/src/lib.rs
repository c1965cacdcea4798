//! Geocoding client for the forecast pipeline.
//!
//! Resolves a street address or ZIP code to coordinates via the
//! geocoding provider's search API, caching results per zip so that
//! repeat lookups for the same location skip the wire entirely.

mod rate_limit;
mod zip;

pub use rate_limit::RateLimiter;
pub use zip::extract_zip;

use cache::TtlCache;
use common::{AppConfig, Coordinate, Error, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Cache namespace for resolved coordinates.
const CACHE_NAMESPACE: &str = "geocode";

/// One search result element from the provider. Only the coordinate
/// fields matter; the provider sends them as decimal strings.
#[derive(Debug, Default, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
}

/// Async client for the geocoding provider.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    cache: TtlCache,
    base_url: String,
    ttl_secs: u64,
    limiter: RateLimiter,
}

impl GeocodeClient {
    pub fn new(cache: TtlCache, config: &AppConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build geocoding HTTP client");

        Self {
            client,
            cache,
            base_url: config.geocode_url.trim_end_matches('/').to_string(),
            ttl_secs: config.cache_ttl_secs,
            limiter: RateLimiter::new(),
        }
    }

    /// Resolve an address or ZIP code to a coordinate.
    ///
    /// Distinct address strings that share a zip collapse onto one cache
    /// entry, so the cache zip is derived first: the supplied `zip_code`
    /// wins, else a zip is extracted from the address. An address with no
    /// derivable zip is the only caller error here.
    ///
    /// `Ok(None)` means the provider had no match or answered with a
    /// non-success status; that is a degraded result, not a fault.
    pub async fn resolve(&self, address: &str, zip_code: Option<&str>) -> Result<Option<Coordinate>> {
        let supplied_zip = zip_code.map(str::trim).filter(|z| !z.is_empty());
        let zip = match supplied_zip {
            Some(z) => z.to_string(),
            None => extract_zip(address).ok_or(Error::MissingZip)?.to_string(),
        };
        let key = cache_key(&zip);

        if let Some(cached) = self.cached_coordinate(&key) {
            debug!("geocode cache hit for {}", zip);
            return Ok(Some(cached));
        }

        self.limiter.acquire().await;

        let term = supplied_zip.unwrap_or(address);
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", term)])
            .send()
            .await
            .map_err(|e| Error::Geocode(format!("HTTP error for {zip}: {e}")))?;

        if !resp.status().is_success() {
            warn!("geocoding provider returned {} for {}", resp.status(), zip);
            return Ok(None);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::Geocode(format!("body read error for {zip}: {e}")))?;

        let mut results: Vec<Option<GeocodeResult>> = serde_json::from_str(&body)?;
        let first = if results.is_empty() {
            None
        } else {
            results.swap_remove(0)
        };

        let (lat, lon) = match first {
            Some(GeocodeResult {
                lat: Some(lat),
                lon: Some(lon),
            }) => (lat, lon),
            _ => {
                warn!("geocoding provider returned an empty or falsy body for {}", zip);
                return Ok(None);
            }
        };

        let coordinate = Coordinate::new(&lat, &lon, &zip)?;
        let payload = serde_json::to_string(&(
            coordinate.latitude(),
            coordinate.longitude(),
            coordinate.zip_code(),
        ))?;
        self.cache.set(&key, payload, self.ttl_secs);

        info!("providing a newly cached coordinate for {}", zip);
        Ok(Some(coordinate))
    }

    /// A well-formed cached entry, if any. Empty or malformed payloads
    /// (e.g. `[]` from a prior failed lookup) count as a miss so the
    /// lookup can be retried.
    fn cached_coordinate(&self, key: &str) -> Option<Coordinate> {
        let payload = self.cache.get(key)?;
        let parts: Vec<String> = serde_json::from_str(&payload).ok()?;
        match <[String; 3]>::try_from(parts) {
            Ok([lat, lon, zip]) => Coordinate::new(&lat, &lon, &zip).ok(),
            Err(_) => None,
        }
    }
}

fn cache_key(zip: &str) -> String {
    format!("{CACHE_NAMESPACE}:{zip}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> AppConfig {
        AppConfig {
            geocode_url: base_url.to_string(),
            cache_ttl_secs: 1800,
            timeout_secs: 5,
            ..AppConfig::default()
        }
    }

    fn client_against(server: &MockServer) -> (GeocodeClient, TtlCache) {
        let cache = TtlCache::new();
        let client = GeocodeClient::new(cache.clone(), &test_config(&server.uri()));
        (client, cache)
    }

    const ADDRESS: &str = "123 Fake St. Seattle, WA, 98115, US";

    #[tokio::test]
    async fn test_successful_lookup_returns_coordinate_and_caches_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", ADDRESS))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"lat": "47.606210", "lon": "-122.332100"}]"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache) = client_against(&server);
        let coordinate = client.resolve(ADDRESS, None).await.unwrap().unwrap();

        assert_eq!(coordinate.latitude(), "47.6062");
        assert_eq!(coordinate.longitude(), "-122.3321");
        assert_eq!(coordinate.zip_code(), "98115");
        assert_eq!(
            cache.get("geocode:98115").as_deref(),
            Some(r#"["47.6062","-122.3321","98115"]"#)
        );
    }

    #[tokio::test]
    async fn test_supplied_zip_wins_as_query_term_and_cache_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "94043"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"lat": "37.4224", "lon": "-122.0842"}]"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache) = client_against(&server);
        let coordinate = client
            .resolve("somewhere else entirely", Some("94043"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(coordinate.zip_code(), "94043");
        assert!(cache.get("geocode:94043").is_some());
    }

    #[tokio::test]
    async fn test_cached_entry_short_circuits_the_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (client, cache) = client_against(&server);
        cache.set("geocode:98115", r#"["47.6062","-122.3321","98115"]"#, 1800);

        let coordinate = client.resolve(ADDRESS, None).await.unwrap().unwrap();
        assert_eq!(coordinate.latitude(), "47.6062");
        assert_eq!(coordinate.zip_code(), "98115");
    }

    #[tokio::test]
    async fn test_empty_cached_entry_is_a_miss_and_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"[{"lat": "47.6062", "lon": "-122.3321"}]"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache) = client_against(&server);
        cache.set("geocode:98115", "[]", 1800);

        let coordinate = client.resolve(ADDRESS, None).await.unwrap();
        assert!(coordinate.is_some(), "empty cached entry should allow a retry");
    }

    #[tokio::test]
    async fn test_unsuccessful_status_yields_none_without_caching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_raw("[]", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache) = client_against(&server);
        let result = client.resolve(ADDRESS, None).await.unwrap();

        assert!(result.is_none());
        assert!(cache.get("geocode:98115").is_none(), "failed lookups must not be cached");
    }

    #[tokio::test]
    async fn test_empty_body_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .mount(&server)
            .await;

        let (client, _cache) = client_against(&server);
        assert!(client.resolve(ADDRESS, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_first_element_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[null]", "application/json"))
            .mount(&server)
            .await;

        let (client, _cache) = client_against(&server);
        assert!(client.resolve(ADDRESS, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_address_without_zip_is_a_missing_zip_error() {
        let server = MockServer::start().await;
        let (client, _cache) = client_against(&server);

        let result = client.resolve("1 Infinite Loop, Cupertino", None).await;
        assert!(matches!(result, Err(Error::MissingZip)));
    }

    #[tokio::test]
    async fn test_malformed_body_propagates_as_a_fault() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
            .mount(&server)
            .await;

        let (client, _cache) = client_against(&server);
        let result = client.resolve(ADDRESS, None).await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
