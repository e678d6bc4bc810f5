#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City configuration loading.
//!
//! Cities are defined as TOML files embedded at compile time (see
//! [`registry`]). External configurations can be parsed with
//! [`parse_city_toml`], which validates the result before returning it.

pub mod registry;

use hotspot_city_models::{CityConfig, CityConfigError};
use thiserror::Error;

/// Errors that can occur while loading a city configuration.
#[derive(Debug, Error)]
pub enum CityError {
    /// The TOML document could not be deserialized.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration parsed but is not usable.
    #[error("Invalid city configuration: {0}")]
    Invalid(#[from] CityConfigError),

    /// No registered city has the requested code.
    #[error("Unknown city: {code}")]
    UnknownCity {
        /// The code that was looked up.
        code: String,
    },
}

/// Parses and validates a [`CityConfig`] from a TOML string.
///
/// # Errors
///
/// Returns [`CityError::Toml`] if the document is malformed or missing
/// required fields, and [`CityError::Invalid`] if it fails validation.
pub fn parse_city_toml(toml_str: &str) -> Result<CityConfig, CityError> {
    let config: CityConfig = toml::de::from_str(toml_str)?;
    config.validate()?;
    log::debug!(
        "Parsed city config {} ({} landmarks, {} tiers)",
        config.code,
        config.landmarks.len(),
        config.tiers.len()
    );
    Ok(config)
}
