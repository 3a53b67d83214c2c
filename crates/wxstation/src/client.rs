//! Client for the api.weather.gov station observations endpoint.
//!
//! Issues one bounded-timeout GET per refresh, deserializes the
//! `properties` object through typed structs, and normalizes every
//! field into metric units. Retry policy lives in the poller, not
//! here.

use crate::config::Config;
use crate::observation::{
    self, to_celsius, to_degrees, to_kilometers_per_hour, to_pascals, to_percent, Observation,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from a single upstream fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: u16 },

    #[error("payload error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short reason code for logs: one of `network`, `timeout`,
    /// `bad_status`, `parse`.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Network(e) if e.is_timeout() => "timeout",
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "bad_status",
            FetchError::Parse(_) => "parse",
        }
    }
}

type Result<T> = std::result::Result<T, FetchError>;

// ── Payload types ───────────────────────────────────────────────────

/// A measured value plus the unit it was reported in.
///
/// The API reports `value: null` when the station omits a sensor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    #[serde(default)]
    pub unit_code: String,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    temperature: QuantitativeValue,
    #[serde(default)]
    relative_humidity: QuantitativeValue,
    #[serde(default)]
    wind_speed: QuantitativeValue,
    #[serde(default)]
    wind_direction: QuantitativeValue,
    #[serde(default)]
    barometric_pressure: QuantitativeValue,
}

#[derive(Debug, Deserialize)]
struct LatestObservation {
    properties: ObservationProperties,
}

// ── Client ──────────────────────────────────────────────────────────

/// HTTP client for one fixed station.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    observation_url: String,
    station: String,
}

impl WeatherClient {
    /// Build a client from the exporter configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            observation_url: config.observation_url(),
            station: config.station.clone(),
        })
    }

    /// Fetch and normalize the latest observation for the station.
    ///
    /// One GET, no retries. Non-2xx statuses and malformed payloads
    /// are reported as [`FetchError`]; fields the station did not
    /// report come back as `None`.
    pub async fn fetch(&self) -> Result<Observation> {
        let response = self.client.get(&self.observation_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let latest: LatestObservation =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(self.normalize(latest.properties))
    }

    fn normalize(&self, props: ObservationProperties) -> Observation {
        Observation {
            temperature_celsius: self.field("temperature", &props.temperature, to_celsius),
            relative_humidity_percent: self.field(
                "relativeHumidity",
                &props.relative_humidity,
                to_percent,
            ),
            wind_speed_kmh: self.field("windSpeed", &props.wind_speed, to_kilometers_per_hour),
            wind_direction_degrees: self.field(
                "windDirection",
                &props.wind_direction,
                to_degrees,
            ),
            barometric_pressure_pascals: self.field(
                "barometricPressure",
                &props.barometric_pressure,
                to_pascals,
            ),
            observed_at: props.timestamp,
        }
    }

    /// Normalize one field, dropping values in units we cannot convert.
    fn field(
        &self,
        name: &str,
        qv: &QuantitativeValue,
        convert: fn(&str, f64) -> Option<f64>,
    ) -> Option<f64> {
        let value = qv.value?;
        let converted = convert(&qv.unit_code, value);
        if converted.is_none() {
            log::warn!(
                "Station {}: dropping {} reported in unexpected unit '{}'",
                self.station,
                name,
                observation::unit_name(&qv.unit_code)
            );
        }
        converted
    }
}

// ── Tests ───────────────────────────────────────────────────────────
