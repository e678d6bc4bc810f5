//! Projection and landmark distances.

use hotspot_city_models::Landmark;
use hotspot_geography_models::PlanarPoint;
use hotspot_listing_models::{CleanedListing, LandmarkDistance, Listing};
use hotspot_spatial::PlanarProjection;

/// Projects cleaned listings and measures the planar distance from each to
/// every landmark. Order of both listings and landmarks is preserved.
#[must_use]
pub fn locate_listings<P: PlanarProjection + ?Sized>(
    cleaned: Vec<CleanedListing>,
    landmarks: &[Landmark],
    projection: &P,
) -> Vec<Listing> {
    let projected_landmarks: Vec<(&str, PlanarPoint)> = landmarks
        .iter()
        .map(|l| (l.name.as_str(), projection.project(&l.location())))
        .collect();

    cleaned
        .into_iter()
        .map(|record| {
            let position = projection.project(&record.location);
            let landmark_distances: Vec<LandmarkDistance> = projected_landmarks
                .iter()
                .map(|(name, point)| LandmarkDistance {
                    landmark: (*name).to_string(),
                    meters: position.distance_to(point),
                })
                .collect();
            let nearest_landmark_meters = landmark_distances
                .iter()
                .map(|d| d.meters)
                .min_by(f64::total_cmp);

            Listing {
                record,
                position,
                landmark_distances,
                nearest_landmark_meters,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleaned, mercator, offset};

    fn landmark(name: &str, dx: f64, dy: f64) -> Landmark {
        let location = offset(dx, dy);
        Landmark {
            name: name.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }

    #[test]
    fn measures_every_landmark_in_order() {
        let landmarks = vec![landmark("East", 3_000.0, 0.0), landmark("North", 0.0, 400.0)];
        let listings = locate_listings(
            vec![cleaned("a", 0.0, 0.0, 100.0, "N")],
            &landmarks,
            &mercator(),
        );

        let listing = &listings[0];
        let names: Vec<&str> = listing
            .landmark_distances
            .iter()
            .map(|d| d.landmark.as_str())
            .collect();
        assert_eq!(names, ["East", "North"]);
        assert!((listing.distance_to("East").unwrap() - 3_000.0).abs() < 0.01);
        assert!((listing.distance_to("North").unwrap() - 400.0).abs() < 0.01);
        assert!((listing.nearest_landmark_meters.unwrap() - 400.0).abs() < 0.01);
    }

    #[test]
    fn no_landmarks_means_no_nearest_distance() {
        let listings = locate_listings(
            vec![cleaned("a", 10.0, 20.0, 100.0, "N")],
            &[],
            &mercator(),
        );
        assert!(listings[0].landmark_distances.is_empty());
        assert_eq!(listings[0].nearest_landmark_meters, None);
    }

    #[test]
    fn positions_match_projection() {
        let record = cleaned("a", 250.0, -125.0, 100.0, "N");
        let expected = mercator().project(&record.location);
        let listings = locate_listings(vec![record], &[], &mercator());
        assert_eq!(listings[0].position, expected);
    }
}
