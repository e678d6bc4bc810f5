//! Compile-time registry of city configurations.
//!
//! Each entry is a `(code, toml_content)` pair embedded via `include_str!`.
//! Adding a new city requires creating a TOML file in `cities/` and adding
//! a corresponding entry here.

use hotspot_city_models::CityConfig;

use crate::{CityError, parse_city_toml};

/// Number of registered cities. Enforced by a test.
#[cfg(test)]
const EXPECTED_CITY_COUNT: usize = 4;

/// Embedded TOML city definitions.
const CITY_TOMLS: &[(&str, &str)] = &[
    ("nyc", include_str!("../cities/nyc.toml")),
    ("london", include_str!("../cities/london.toml")),
    ("paris", include_str!("../cities/paris.toml")),
    ("los_angeles", include_str!("../cities/los_angeles.toml")),
];

/// Returns all registered cities, sorted by display name.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse or validate. Since
/// these are compile-time constants, failures indicate a development
/// error and are caught by the tests below.
#[must_use]
pub fn all_cities() -> Vec<CityConfig> {
    let mut cities: Vec<CityConfig> = CITY_TOMLS
        .iter()
        .map(|(code, toml_str)| {
            parse_city_toml(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse city config '{code}': {e}"))
        })
        .collect();
    cities.sort_by(|a, b| a.name.cmp(&b.name));
    cities
}

/// Looks up a registered city by code (case-insensitive).
///
/// # Errors
///
/// Returns [`CityError::UnknownCity`] if no city has that code.
pub fn find_city(code: &str) -> Result<CityConfig, CityError> {
    let code = code.trim();
    all_cities()
        .into_iter()
        .find(|city| city.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| CityError::UnknownCity {
            code: code.to_string(),
        })
}
