//! Prometheus text exposition for cached observations.
//!
//! Renders the descriptor table into the text exposition format for
//! scraping. Absent fields are omitted entirely rather than emitted as
//! a sentinel value; an empty cache still renders a valid page.

use crate::observation::{CacheEntry, Observation};
use std::fmt::Write;

/// Content type for the exposition format, version 0.0.4.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Static mapping from one observation field to an exported gauge.
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub read: fn(&Observation) -> Option<f64>,
}

/// One gauge per observation field, fixed at compile time.
pub const DESCRIPTORS: &[MetricDescriptor] = &[
    MetricDescriptor {
        name: "wxstation_temperature_celsius",
        help: "Station temperature in degrees celsius.",
        read: |obs| obs.temperature_celsius,
    },
    MetricDescriptor {
        name: "wxstation_relative_humidity_percent",
        help: "Station relative humidity (0-100).",
        read: |obs| obs.relative_humidity_percent,
    },
    MetricDescriptor {
        name: "wxstation_wind_speed_kmh",
        help: "Station wind speed in kilometers per hour.",
        read: |obs| obs.wind_speed_kmh,
    },
    MetricDescriptor {
        name: "wxstation_wind_direction_degrees",
        help: "Station wind direction in degrees.",
        read: |obs| obs.wind_direction_degrees,
    },
    MetricDescriptor {
        name: "wxstation_barometric_pressure_pascals",
        help: "Station barometric pressure in pascals.",
        read: |obs| obs.barometric_pressure_pascals,
    },
];

const AGE_METRIC: &str = "wxstation_last_fetch_age_seconds";

/// Render the current cache state as exposition text.
///
/// Total over all cache states: an empty cache yields only the
/// build-info gauge, a populated one adds a gauge per present field
/// plus the staleness gauge. Never touches the network.
pub fn render(entry: Option<&CacheEntry>) -> String {
    let mut out = String::new();

    out.push_str("# HELP wxstation_build_info Exporter build information.\n");
    out.push_str("# TYPE wxstation_build_info gauge\n");
    let _ = writeln!(
        out,
        "wxstation_build_info{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    );

    let Some(entry) = entry else {
        return out;
    };

    for descriptor in DESCRIPTORS {
        if let Some(value) = (descriptor.read)(&entry.observation) {
            let _ = writeln!(out, "# HELP {} {}", descriptor.name, descriptor.help);
            let _ = writeln!(out, "# TYPE {} gauge", descriptor.name);
            let _ = writeln!(out, "{} {}", descriptor.name, value);
        }
    }

    // Always present when an entry exists, so scrapers can alert on a
    // stalled refresh loop even while we keep serving stale values.
    let _ = writeln!(
        out,
        "# HELP {AGE_METRIC} Seconds since the last successful upstream fetch."
    );
    let _ = writeln!(out, "# TYPE {AGE_METRIC} gauge");
    let _ = writeln!(out, "{AGE_METRIC} {:.3}", entry.age_seconds());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;
    use std::time::Instant;

    fn full_observation() -> Observation {
        Observation {
            temperature_celsius: Some(22.8),
            relative_humidity_percent: Some(54.1),
            wind_speed_kmh: Some(9.36),
            wind_direction_degrees: Some(190.0),
            barometric_pressure_pascals: Some(101830.0),
            observed_at: None,
        }
    }

    fn entry(observation: Observation) -> CacheEntry {
        CacheEntry {
            observation,
            fetched_at: Instant::now(),
        }
    }

    /// Every line must be a comment or a `name value` sample.
    fn assert_valid_exposition(output: &str) {
        for line in output.lines() {
            if line.starts_with('#') {
                assert!(
                    line.starts_with("# HELP ") || line.starts_with("# TYPE "),
                    "unexpected comment line: {line}"
                );
                continue;
            }
            let mut parts = line.split_whitespace();
            let name = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");
            assert!(!name.is_empty(), "sample line missing name: {line}");
            // Labels stay attached to the name; the value must parse.
            assert!(
                value.parse::<f64>().is_ok(),
                "sample line has non-numeric value: {line}"
            );
            assert!(parts.next().is_none(), "trailing tokens: {line}");
        }
    }

    #[test]
    fn empty_cache_renders_build_info_only() {
        let output = render(None);

        assert!(output.contains("wxstation_build_info{version="));
        assert!(!output.contains("wxstation_temperature_celsius"));
        assert!(!output.contains(AGE_METRIC));
        assert_valid_exposition(&output);
    }

    #[test]
    fn full_observation_renders_every_gauge() {
        let output = render(Some(&entry(full_observation())));

        assert!(output.contains("# TYPE wxstation_temperature_celsius gauge\n"));
        assert!(output.contains("wxstation_temperature_celsius 22.8\n"));
        assert!(output.contains("wxstation_relative_humidity_percent 54.1\n"));
        assert!(output.contains("wxstation_wind_speed_kmh 9.36\n"));
        assert!(output.contains("wxstation_wind_direction_degrees 190\n"));
        assert!(output.contains("wxstation_barometric_pressure_pascals 101830\n"));
        assert!(output.contains(AGE_METRIC));
        assert_valid_exposition(&output);
    }

    #[test]
    fn one_gauge_line_per_present_field() {
        let output = render(Some(&entry(full_observation())));
        for descriptor in DESCRIPTORS {
            let samples = output
                .lines()
                .filter(|l| l.starts_with(descriptor.name))
                .count();
            assert_eq!(samples, 1, "expected one sample for {}", descriptor.name);
        }
    }

    #[test]
    fn null_field_is_omitted_entirely() {
        let mut observation = full_observation();
        observation.relative_humidity_percent = None;
        let output = render(Some(&entry(observation)));

        assert!(!output.contains("wxstation_relative_humidity_percent"));
        assert!(output.contains("wxstation_temperature_celsius 22.8\n"));
        assert!(output.contains("wxstation_wind_speed_kmh 9.36\n"));
        assert_valid_exposition(&output);
    }

    #[test]
    fn staleness_gauge_present_with_entry() {
        let output = render(Some(&entry(full_observation())));
        let age_line = output
            .lines()
            .find(|l| l.starts_with(AGE_METRIC))
            .expect("age sample missing");
        let value: f64 = age_line
            .split_whitespace()
            .nth(1)
            .expect("age sample missing value")
            .parse()
            .expect("age value not numeric");
        assert!(value >= 0.0);
    }
}
