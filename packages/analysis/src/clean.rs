//! Record cleaning.
//!
//! Validates raw listings against the city bounding box and cleaning
//! options. Unusable records are dropped and tallied in a
//! [`CleaningReport`]; nothing here ever fails or invents data.

use std::collections::BTreeSet;

use hotspot_analysis_models::CleaningReport;
use hotspot_city_models::CleaningOptions;
use hotspot_geography_models::{BoundingBox, GeoPoint};
use hotspot_listing_models::{CleanedListing, RawListing, RoomType, UNKNOWN_NEIGHBORHOOD};

/// Availability is reported in days of the coming year.
const MAX_AVAILABILITY_DAYS: u32 = 365;

/// Cleaned listings in input order plus the drop tally.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// Surviving listings.
    pub listings: Vec<CleanedListing>,
    /// Counts by drop reason.
    pub report: CleaningReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    MissingId,
    InvalidPrice,
    AboveMaxPrice,
    MissingCoordinates,
    OutOfBounds,
}

impl DropReason {
    const fn tally(self, report: &mut CleaningReport) {
        match self {
            Self::MissingId => report.missing_id += 1,
            Self::InvalidPrice => report.invalid_price += 1,
            Self::AboveMaxPrice => report.above_max_price += 1,
            Self::MissingCoordinates => report.missing_coordinates += 1,
            Self::OutOfBounds => report.out_of_bounds += 1,
        }
    }
}

/// Cleans `raw`, keeping the first valid occurrence of each identifier.
#[must_use]
pub fn clean_listings(
    raw: &[RawListing],
    bounds: &BoundingBox,
    options: &CleaningOptions,
) -> CleanOutcome {
    let mut report = CleaningReport {
        input_count: raw.len(),
        ..CleaningReport::default()
    };
    let mut seen_ids = BTreeSet::new();
    let mut listings = Vec::with_capacity(raw.len());

    for record in raw {
        match clean_record(record, bounds, options) {
            Ok(listing) => {
                if seen_ids.insert(listing.id.clone()) {
                    listings.push(listing);
                } else {
                    report.duplicate_id += 1;
                }
            }
            Err(reason) => reason.tally(&mut report),
        }
    }

    report.kept_count = listings.len();

    if report.dropped_count() > 0 {
        log::warn!(
            "Dropped {} of {} listings (missing id: {}, invalid price: {}, above max price: {}, missing coordinates: {}, out of bounds: {}, duplicate id: {})",
            report.dropped_count(),
            report.input_count,
            report.missing_id,
            report.invalid_price,
            report.above_max_price,
            report.missing_coordinates,
            report.out_of_bounds,
            report.duplicate_id,
        );
    }

    CleanOutcome { listings, report }
}

fn clean_record(
    record: &RawListing,
    bounds: &BoundingBox,
    options: &CleaningOptions,
) -> Result<CleanedListing, DropReason> {
    let id = record
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(DropReason::MissingId)?;

    let price = record
        .price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or(DropReason::InvalidPrice)?;
    if options.max_price.is_some_and(|max| price > max) {
        return Err(DropReason::AboveMaxPrice);
    }

    let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
        return Err(DropReason::MissingCoordinates);
    };
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(DropReason::MissingCoordinates);
    }
    let location = GeoPoint::new(latitude, longitude);
    if !bounds.contains(&location) {
        return Err(DropReason::OutOfBounds);
    }

    let neighborhood = non_blank(record.neighborhood.as_deref())
        .unwrap_or(UNKNOWN_NEIGHBORHOOD)
        .to_string();

    Ok(CleanedListing {
        id: id.to_string(),
        location,
        price,
        room_type: RoomType::from_label(record.room_type.as_deref()),
        neighborhood,
        neighborhood_group: non_blank(record.neighborhood_group.as_deref()).map(str::to_string),
        review_count: record.review_count.unwrap_or(0),
        availability: record
            .availability
            .map(|days| days.min(MAX_AVAILABILITY_DAYS)),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
