//! Geographic to planar coordinate conversion.
//!
//! Only spherical Web Mercator (EPSG:3857) is implemented. Distances on
//! this plane are inflated by `1 / cos(latitude)` relative to ground
//! distance, which is uniform enough at city scale for radius-based
//! clustering as long as every point in a run shares the projection.

use std::f64::consts::FRAC_PI_4;
use std::str::FromStr;

use hotspot_geography_models::{GeoPoint, PlanarPoint};
use thiserror::Error;

/// Sphere radius used by Web Mercator, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Latitude limit of Web Mercator; inputs are clamped to `±` this value.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// Errors raised when a projection cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The declared source coordinate reference is not supported.
    #[error("Unsupported coordinate reference: {reference}")]
    UnsupportedReference {
        /// The reference as configured.
        reference: String,
    },
}

/// Source coordinate references the projector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateReference {
    /// WGS84 latitude/longitude degrees (EPSG:4326).
    Wgs84,
}

impl FromStr for CoordinateReference {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326" | "WGS84" | "CRS84" | "OGC:CRS84" => Ok(Self::Wgs84),
            _ => Err(ProjectionError::UnsupportedReference {
                reference: s.to_string(),
            }),
        }
    }
}

/// A reversible mapping between geographic and planar coordinates.
pub trait PlanarProjection: Send + Sync {
    /// Projects a geographic point onto the plane.
    fn project(&self, point: &GeoPoint) -> PlanarPoint;

    /// Maps a planar point back to geographic coordinates.
    fn unproject(&self, point: &PlanarPoint) -> GeoPoint;
}

/// Spherical Web Mercator (EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebMercator {
    source: CoordinateReference,
}

impl WebMercator {
    /// Builds a projector for coordinates in the given source reference.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnsupportedReference`] if `reference`
    /// is not a WGS84 identifier.
    pub fn for_source(reference: &str) -> Result<Self, ProjectionError> {
        let source = reference.parse()?;
        Ok(Self { source })
    }

    /// The source coordinate reference.
    #[must_use]
    pub const fn source(&self) -> CoordinateReference {
        self.source
    }
}

impl PlanarProjection for WebMercator {
    fn project(&self, point: &GeoPoint) -> PlanarPoint {
        let latitude = point
            .latitude
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let longitude = point.longitude.to_radians();

        PlanarPoint::new(
            EARTH_RADIUS_METERS * longitude,
            EARTH_RADIUS_METERS * (FRAC_PI_4 + latitude / 2.0).tan().ln(),
        )
    }

    fn unproject(&self, point: &PlanarPoint) -> GeoPoint {
        let longitude = (point.x / EARTH_RADIUS_METERS).to_degrees();
        let latitude = 2.0f64
            .mul_add(
                (point.y / EARTH_RADIUS_METERS).exp().atan(),
                -std::f64::consts::FRAC_PI_2,
            )
            .to_degrees();

        GeoPoint::new(latitude, longitude)
    }
}
