//! Background refresh loop.
//!
//! Drives the upstream client at a fixed interval and writes successes
//! into the cache. Fetch failures are logged and absorbed here; they
//! never clear the cached entry and never reach the HTTP layer.

use crate::cache::ObservationCache;
use crate::client::WeatherClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Run one fetch and store the result on success.
pub async fn refresh_once(client: &WeatherClient, cache: &ObservationCache) {
    match client.fetch().await {
        Ok(observation) => {
            log::info!(
                "Fetched observation (observed at {})",
                observation
                    .observed_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            cache.set(observation);
        }
        Err(e) => {
            // Keep serving the previous entry; the staleness gauge
            // makes the outage visible to scrapers.
            log::warn!("Upstream fetch failed ({}): {}", e.reason(), e);
        }
    }
}

/// Fetch on a fixed cadence until shutdown. The first tick fires
/// immediately so a scrape shortly after startup already has data.
pub async fn run(
    client: WeatherClient,
    cache: Arc<ObservationCache>,
    period: Duration,
    mut shutdown: watch::Receiver<()>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                log::info!("Refresh loop shutting down...");
                return;
            }
            _ = interval.tick() => {
                refresh_once(&client, &cache).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OBSERVATION_BODY: &str = r#"{
        "properties": {
            "timestamp": "2024-03-01T12:52:00+00:00",
            "temperature": {"unitCode": "wmoUnit:degC", "value": 22.8},
            "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 54.1},
            "windSpeed": {"unitCode": "wmoUnit:km_h-1", "value": 9.36},
            "windDirection": {"unitCode": "wmoUnit:degree_(angle)", "value": 190},
            "barometricPressure": {"unitCode": "wmoUnit:Pa", "value": 101830}
        }
    }"#;

    async fn client_for(server: &MockServer) -> WeatherClient {
        let mut config = Config::default();
        config.api_base = server.uri();
        WeatherClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn success_populates_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/KBOS/observations/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(OBSERVATION_BODY, "application/geo+json"),
            )
            .mount(&server)
            .await;

        let cache = ObservationCache::new();
        refresh_once(&client_for(&server).await, &cache).await;

        let entry = cache.get().expect("cache should be populated");
        assert_eq!(entry.observation.temperature_celsius, Some(22.8));
    }

    #[tokio::test]
    async fn failure_leaves_previous_entry_untouched() {
        let good = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/KBOS/observations/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(OBSERVATION_BODY, "application/geo+json"),
            )
            .mount(&good)
            .await;

        let bad = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/KBOS/observations/latest"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&bad)
            .await;

        let cache = ObservationCache::new();
        refresh_once(&client_for(&good).await, &cache).await;
        let before = cache.get().expect("first fetch should populate");

        refresh_once(&client_for(&bad).await, &cache).await;
        let after = cache.get().expect("failed fetch must not clear the cache");

        assert_eq!(before.observation, after.observation);
    }

    #[tokio::test]
    async fn failure_on_empty_cache_stays_empty() {
        let bad = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/KBOS/observations/latest"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&bad)
            .await;

        let cache = ObservationCache::new();
        refresh_once(&client_for(&bad).await, &cache).await;

        assert!(cache.get().is_none());
    }

    #[tokio::test]
    async fn run_exits_on_shutdown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stations/KBOS/observations/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(OBSERVATION_BODY, "application/geo+json"),
            )
            .mount(&server)
            .await;

        let cache = Arc::new(ObservationCache::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let client = client_for(&server).await;
        let handle = tokio::spawn(run(
            client,
            Arc::clone(&cache),
            Duration::from_secs(3600),
            shutdown_rx,
        ));

        // First tick fires immediately; give it a moment to land.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get().is_some());

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should exit promptly on shutdown")
            .unwrap();
    }
}
