//! Fixtures shared by the stage tests.
//!
//! Synthetic listings are laid out in Web Mercator meters around a fixed
//! origin in Midtown Manhattan and converted back to latitude/longitude,
//! so distances in tests read directly as projected meters.

use hotspot_city_models::{
    CityConfig, CleaningOptions, DEFAULT_COORDINATE_REFERENCE, Landmark, ScoringOptions,
    TierDefinition,
};
use hotspot_geography_models::{BoundingBox, GeoPoint, PlanarPoint};
use hotspot_listing_models::{CleanedListing, Listing, RawListing, RoomType};
use hotspot_spatial::{PlanarProjection, WebMercator};

pub const ORIGIN: GeoPoint = GeoPoint::new(40.7580, -73.9855);

pub fn mercator() -> WebMercator {
    WebMercator::for_source(DEFAULT_COORDINATE_REFERENCE).unwrap()
}

pub fn origin_planar() -> PlanarPoint {
    mercator().project(&ORIGIN)
}

/// Geographic location `dx`/`dy` projected meters from the origin.
pub fn offset(dx: f64, dy: f64) -> GeoPoint {
    let origin = origin_planar();
    mercator().unproject(&PlanarPoint::new(origin.x + dx, origin.y + dy))
}

pub fn test_bounds() -> BoundingBox {
    BoundingBox {
        min_lat: 40.4,
        max_lat: 41.0,
        min_lon: -74.3,
        max_lon: -73.6,
    }
}

pub fn raw(id: &str, latitude: f64, longitude: f64, price: f64, neighborhood: &str) -> RawListing {
    RawListing {
        id: Some(id.to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
        price: Some(price),
        room_type: Some("Entire home/apt".to_string()),
        neighborhood: Some(neighborhood.to_string()),
        ..RawListing::default()
    }
}

/// Raw listing placed `dx`/`dy` projected meters from the origin.
pub fn raw_at(id: &str, dx: f64, dy: f64, price: f64, neighborhood: &str) -> RawListing {
    let location = offset(dx, dy);
    raw(id, location.latitude, location.longitude, price, neighborhood)
}

pub fn cleaned(id: &str, dx: f64, dy: f64, price: f64, neighborhood: &str) -> CleanedListing {
    CleanedListing {
        id: id.to_string(),
        location: offset(dx, dy),
        price,
        room_type: RoomType::EntireHome,
        neighborhood: neighborhood.to_string(),
        neighborhood_group: None,
        review_count: 0,
        availability: None,
    }
}

/// Listing already positioned on the plane, with no landmark distances.
pub fn located(id: &str, dx: f64, dy: f64, price: f64, neighborhood: &str) -> Listing {
    let origin = origin_planar();
    Listing {
        record: cleaned(id, dx, dy, price, neighborhood),
        position: PlanarPoint::new(origin.x + dx, origin.y + dy),
        landmark_distances: Vec::new(),
        nearest_landmark_meters: None,
    }
}

pub fn tier(
    name: &str,
    min_price: f64,
    max_price: f64,
    eps_meters: f64,
    min_points: usize,
) -> TierDefinition {
    TierDefinition {
        name: name.to_string(),
        min_price,
        max_price,
        upper_inclusive: false,
        eps_meters,
        min_points,
    }
}

/// A city around the origin with a single landmark at the origin and the
/// standard premium/luxury/ultra tiers.
pub fn test_city() -> CityConfig {
    let mut ultra = tier("ultra_luxury", 2_500.0, 5_000.0, 800.0, 3);
    ultra.upper_inclusive = true;

    CityConfig {
        code: "test".to_string(),
        name: "Test City".to_string(),
        coordinate_reference: DEFAULT_COORDINATE_REFERENCE.to_string(),
        bounds: test_bounds(),
        landmarks: vec![Landmark {
            name: "Center".to_string(),
            latitude: ORIGIN.latitude,
            longitude: ORIGIN.longitude,
        }],
        tiers: vec![
            tier("premium", 200.0, 1_000.0, 300.0, 10),
            tier("luxury", 1_000.0, 2_500.0, 500.0, 5),
            ultra,
        ],
        cleaning: CleaningOptions::default(),
        scoring: ScoringOptions::default(),
    }
}
