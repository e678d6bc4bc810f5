//! Listing file loading.
//!
//! Reads an Inside Airbnb style `listings.csv`, optionally gzip
//! compressed. Rows that cannot be deserialized at all are skipped and
//! counted; everything else is left for the analysis cleaner to judge.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use flate2::read::GzDecoder;
use hotspot_analysis::progress::ProgressCallback;
use hotspot_listing_models::RawListing;

/// Errors from reading a listings file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The file could not be opened.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV header or stream is unreadable.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// Records read from a listings file.
pub struct LoadedListings {
    /// Rows in file order.
    pub listings: Vec<RawListing>,
    /// Rows skipped as malformed.
    pub skipped: u64,
}

/// Loads raw listings from `path`. Files ending in `.gz` are decompressed.
///
/// # Errors
///
/// Returns [`InputError`] if the file cannot be opened or its header
/// cannot be read.
pub fn load_listings(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedListings, InputError> {
    let file = File::open(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let reader: Box<dyn Read> = if is_gzipped(path) {
        log::debug!("Decompressing {}", path.display());
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let loaded = parse_listings(reader, progress).map_err(|e| InputError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    log::info!(
        "Loaded {} listings from {} ({} malformed rows skipped)",
        loaded.listings.len(),
        path.display(),
        loaded.skipped
    );

    Ok(loaded)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Parses listings CSV from any reader.
///
/// # Errors
///
/// Returns the [`csv::Error`] if the header row cannot be read.
pub fn parse_listings(
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedListings, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.headers()?;

    let mut listings = Vec::new();
    let mut skipped = 0u64;

    for result in csv_reader.deserialize::<RawListing>() {
        match result {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                skipped += 1;
            }
        }
        progress.inc(1);
    }

    Ok(LoadedListings { listings, skipped })
}
