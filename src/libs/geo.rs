//! Coordinates and distance formulas.
//!
//! Two formulas are available:
//!
//! - **Planar**: treats a degree of latitude as 111 km and a degree of
//!   longitude as `111 * cos(lat)` km, then combines both legs with
//!   Pythagoras. Good enough for a geofence a few hundred meters wide,
//!   drifts at long range and near the poles.
//! - **Haversine**: great-circle distance on a spherical Earth.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilometers per degree used by the planar approximation.
const KM_PER_DEGREE: f64 = 111.0;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFormula {
    #[default]
    Planar,
    Haversine,
}

impl DistanceFormula {
    /// Distance in meters from `from` to `to`.
    pub fn distance(self, from: Coordinate, to: Coordinate) -> f64 {
        match self {
            DistanceFormula::Planar => planar_distance(from, to),
            DistanceFormula::Haversine => haversine_distance(from, to),
        }
    }

    pub fn all() -> [DistanceFormula; 2] {
        [DistanceFormula::Planar, DistanceFormula::Haversine]
    }
}

impl fmt::Display for DistanceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceFormula::Planar => write!(f, "planar"),
            DistanceFormula::Haversine => write!(f, "haversine"),
        }
    }
}

impl std::str::FromStr for DistanceFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planar" => Ok(DistanceFormula::Planar),
            "haversine" => Ok(DistanceFormula::Haversine),
            other => Err(format!("unknown distance formula '{}'", other)),
        }
    }
}

/// Planar approximation in meters. The longitude leg is scaled by the
/// cosine of `from`'s latitude.
pub fn planar_distance(from: Coordinate, to: Coordinate) -> f64 {
    let delta_lat = to.latitude - from.latitude;
    let delta_lon = to.longitude - from.longitude;

    let north_km = delta_lat * KM_PER_DEGREE;
    let east_km = delta_lon * KM_PER_DEGREE * from.latitude.to_radians().cos();

    (north_km.powi(2) + east_km.powi(2)).sqrt() * 1000.0
}

/// Great-circle distance in meters.
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
