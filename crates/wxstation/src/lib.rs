//! wxstation - Prometheus exporter for NWS station weather observations.
//!
//! Polls the api.weather.gov latest-observation endpoint for one fixed
//! station on a configurable interval, keeps the most recent successful
//! observation in a single-slot cache, and serves the values as gauges
//! in the Prometheus text exposition format.
//!
//! A failing upstream degrades to serving the last known values with an
//! ever-growing `wxstation_last_fetch_age_seconds`, never to exporter
//! downtime.

pub mod cache;
pub mod client;
pub mod config;
pub mod metrics;
pub mod observation;
pub mod poller;
pub mod server;

pub use cache::ObservationCache;
pub use client::{FetchError, WeatherClient};
pub use config::{Config, ConfigError};
pub use observation::{CacheEntry, Observation};
