// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.
//!
//! The engine never reads global state on its own: callers build an
//! [`EngineConfig`] (from code, JSON, or environment variables) and pass the
//! relevant part to each operation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::ServiceArea;

/// Environment variable prefix used by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "FIBERMAP_";

/// What the projector normalizes positions against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionFrame {
    /// Bounding box of the positioned elements, padded.
    #[default]
    FitToData,
    /// The configured service area.
    ServiceArea,
}

/// Layout parameters for topology projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionConfig {
    /// Upper bound of normalized coordinates (`1.0` or `100.0` typically).
    pub scale: f64,
    /// Multiplier applied to planar edge lengths.
    pub length_factor: f64,
    /// Fraction of the frame added on each side when fitting to data.
    pub padding: f64,
    pub frame: ProjectionFrame,
    /// Seed for fallback coordinates of unpositioned elements.
    pub fallback_seed: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            scale: 100.0,
            length_factor: 1.0,
            padding: 0.05,
            frame: ProjectionFrame::default(),
            fallback_seed: 0x5eed,
        }
    }
}

/// Everything the engine can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub service_area: ServiceArea,
    pub projection: ProjectionConfig,
}

impl EngineConfig {
    /// Loads configuration from `FIBERMAP_*` environment variables.
    ///
    /// Unset variables fall back to defaults; set but unparseable values are
    /// an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let read = |name: &str, fallback: f64| -> Result<f64> {
            let key = format!("{ENV_PREFIX}{name}");
            match lookup(&key) {
                None => Ok(fallback),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or(Error::InvalidConfig { key, value: raw }),
            }
        };

        let area = defaults.service_area;
        let service_area = ServiceArea::new(
            read("MIN_LAT", area.min_lat)?,
            read("MAX_LAT", area.max_lat)?,
            read("MIN_LON", area.min_lon)?,
            read("MAX_LON", area.max_lon)?,
        )?;

        let mut projection = defaults.projection;
        projection.scale = read("PROJECTION_SCALE", projection.scale)?;
        projection.length_factor = read("LENGTH_FACTOR", projection.length_factor)?;
        projection.padding = read("PROJECTION_PADDING", projection.padding)?;

        let frame_key = format!("{ENV_PREFIX}PROJECTION_FRAME");
        if let Some(raw) = lookup(&frame_key) {
            let frame = match raw.trim() {
                "fit-to-data" => Some(ProjectionFrame::FitToData),
                "service-area" => Some(ProjectionFrame::ServiceArea),
                _ => None,
            };
            projection.frame = frame.ok_or(Error::InvalidConfig {
                key: frame_key,
                value: raw,
            })?;
        }

        let seed_key = format!("{ENV_PREFIX}LAYOUT_SEED");
        if let Some(raw) = lookup(&seed_key) {
            projection.fallback_seed = raw.trim().parse().map_err(|_| Error::InvalidConfig {
                key: seed_key,
                value: raw,
            })?;
        }

        let config = Self {
            service_area,
            projection,
        };
        tracing::debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    /// Parses configuration from JSON, validating the service area.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.service_area.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: FxHashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("FIBERMAP_MIN_LAT", "18.0"),
            ("FIBERMAP_MAX_LAT", " 19.0 "),
            ("FIBERMAP_PROJECTION_SCALE", "1"),
            ("FIBERMAP_PROJECTION_FRAME", "service-area"),
            ("FIBERMAP_LAYOUT_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.service_area.min_lat, 18.0);
        assert_eq!(config.service_area.max_lat, 19.0);
        assert_eq!(config.projection.scale, 1.0);
        assert_eq!(config.projection.frame, ProjectionFrame::ServiceArea);
        assert_eq!(config.projection.fallback_seed, 42);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = EngineConfig::from_lookup(lookup(&[("FIBERMAP_MIN_LON", "west")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "FIBERMAP_MIN_LON"));

        let err = EngineConfig::from_lookup(lookup(&[("FIBERMAP_MIN_LAT", "25.0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidServiceArea(_)));

        assert!(EngineConfig::from_lookup(lookup(&[("FIBERMAP_LAYOUT_SEED", "-1")])).is_err());
    }

    #[test]
    fn json_config_is_partial_and_validated() {
        let config = EngineConfig::from_json(r#"{ "projection": { "scale": 1.0 } }"#).unwrap();
        assert_eq!(config.projection.scale, 1.0);
        assert_eq!(config.projection.length_factor, 1.0);
        assert_eq!(config.service_area, ServiceArea::default());

        let bad = r#"{ "serviceArea": { "minLat": 5, "maxLat": 1, "minLon": 0, "maxLon": 1 } }"#;
        assert!(EngineConfig::from_json(bad).is_err());
    }
}
