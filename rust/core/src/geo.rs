// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geographic placement: service-area validation and great-circle distance.
//!
//! Positions are `(longitude, latitude)` pairs in decimal degrees (WGS84),
//! matching the `[lon, lat]` order used by the map collaborator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius used by the Haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", from = "[f64; 2]")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Builds a point from a loose `[lon, lat]` slice.
    ///
    /// Returns `None` unless the slice holds exactly two finite numbers.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        match coords {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Some(Self::new(*lon, *lat)),
            _ => None,
        }
    }

    /// Builds a point from an untyped JSON value: either `[-69.9, 18.48]` or
    /// an object with `lon`/`lng` and `lat` members.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Array(items) => {
                let coords: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                Self::from_slice(&coords?)
            }
            Value::Object(map) => {
                let lon = map.get("lon").or_else(|| map.get("lng"))?.as_f64()?;
                let lat = map.get("lat")?.as_f64()?;
                Self::from_slice(&[lon, lat])
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new(lon, lat)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

/// Rectangular service area used to accept or reject placements.
///
/// Bounds are inclusive. The default covers the Dominican Republic, where the
/// dashboard's networks are deployed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceArea {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self {
            min_lat: 17.36,
            max_lat: 19.94,
            min_lon: -72.01,
            max_lon: -68.32,
        }
    }
}

impl ServiceArea {
    /// Creates a service area, rejecting non-finite or inverted bounds.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        let area = Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        };
        area.validate()?;
        Ok(area)
    }

    /// Checks that the bounds are finite, ordered, and on the globe.
    pub fn validate(&self) -> Result<()> {
        let bounds = [self.min_lat, self.max_lat, self.min_lon, self.max_lon];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidServiceArea("bounds must be finite".into()));
        }
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(Error::InvalidServiceArea(format!(
                "inverted bounds: lat [{}, {}], lon [{}, {}]",
                self.min_lat, self.max_lat, self.min_lon, self.max_lon
            )));
        }
        if self.min_lat < -90.0 || self.max_lat > 90.0 || self.min_lon < -180.0 || self.max_lon > 180.0
        {
            return Err(Error::InvalidServiceArea("bounds exceed WGS84 range".into()));
        }
        Ok(())
    }

    /// Returns `true` if the point lies inside the rectangle (inclusive).
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.is_finite()
            && p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }

    /// Clamps a point onto the rectangle.
    pub fn clamp(&self, p: GeoPoint) -> GeoPoint {
        GeoPoint::new(
            p.lon.clamp(self.min_lon, self.max_lon),
            p.lat.clamp(self.min_lat, self.max_lat),
        )
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Longitude and latitude extents in degrees.
    pub fn span(&self) -> (f64, f64) {
        (self.max_lon - self.min_lon, self.max_lat - self.min_lat)
    }
}

/// Validates a loose `[lon, lat]` tuple against a service area.
///
/// Returns `false` for anything that is not exactly two finite numbers, and
/// for points outside the area. Never panics.
pub fn validate_position(coords: &[f64], area: &ServiceArea) -> bool {
    GeoPoint::from_slice(coords).is_some_and(|p| area.contains(p))
}

/// Great-circle distance between two points in kilometers (Haversine).
///
/// Symmetric, zero for coincident points, and finite for antipodal points.
/// Non-finite coordinates yield `0.0`; validate positions before measuring.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return 0.0;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total length of a polyline in kilometers.
pub fn path_length_km(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_km(pair[0], pair[1]))
        .sum()
}
