//! Writing analysis results to disk.
//!
//! Every file of a run shares the prefix `{city}_{date}_min{threshold}`
//! so repeated runs with different snapshots or thresholds sit side by
//! side in one directory.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use hotspot_analysis_models::{AnalysisSummary, Cluster};
use hotspot_city_models::CityConfig;
use serde::Serialize;

/// Errors from writing result files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A file or directory could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path being written.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Path being written.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// Output file naming for one run.
pub struct OutputFiles {
    dir: PathBuf,
    prefix: String,
}

impl OutputFiles {
    /// Naming for `city` on `date` at `premium_threshold`.
    #[must_use]
    pub fn new(dir: &Path, city: &str, date: &str, premium_threshold: f64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: format!("{city}_{date}_min{}", format_threshold(premium_threshold)),
        }
    }

    /// Full path for the file with the given key and extension.
    #[must_use]
    pub fn path(&self, key: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}_{key}.{extension}", self.prefix))
    }
}

/// Whole-dollar thresholds render without a fractional part.
fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{threshold:.0}")
    } else {
        threshold.to_string()
    }
}

/// Writes every result file and returns the paths written.
///
/// # Errors
///
/// Returns the first [`ExportError`] encountered.
pub fn write_all(
    files: &OutputFiles,
    summary: &AnalysisSummary,
    config: &CityConfig,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(&files.dir).map_err(|e| ExportError::Io {
        path: files.dir.display().to_string(),
        source: e,
    })?;

    let mut written = Vec::new();

    let path = files.path("summary", "json");
    write_json(&path, summary)?;
    written.push(path);

    for tier in &summary.tiers {
        let path = files.path(&format!("{}_clusters", tier.tier), "csv");
        write_csv(&path, tier.clusters.iter().map(ClusterRow::from))?;
        written.push(path);
    }

    let path = files.path("neighborhood_scores", "csv");
    write_csv(&path, summary.neighborhoods.iter())?;
    written.push(path);

    let path = files.path("analyzed_data", "csv");
    write_listing_table(&path, summary, config)?;
    written.push(path);

    let path = files.path("hotspots", "geojson");
    write_json(&path, &hotspot_features(summary, config))?;
    written.push(path);

    for path in &written {
        log::debug!("Wrote {}", path.display());
    }

    Ok(written)
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(create(path)?, value).map_err(|e| ExportError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_csv<T: Serialize>(
    path: &Path,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = csv::Writer::from_writer(create(path)?);
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Flat cluster record for CSV output.
#[derive(Serialize)]
struct ClusterRow<'a> {
    tier: &'a str,
    cluster_id: u32,
    listing_count: usize,
    average_price: f64,
    total_value: f64,
    min_price: f64,
    max_price: f64,
    centroid_latitude: f64,
    centroid_longitude: f64,
    centroid_x: f64,
    centroid_y: f64,
}

impl<'a> From<&'a Cluster> for ClusterRow<'a> {
    fn from(cluster: &'a Cluster) -> Self {
        Self {
            tier: &cluster.tier,
            cluster_id: cluster.cluster_id,
            listing_count: cluster.listing_count,
            average_price: cluster.average_price,
            total_value: cluster.total_value,
            min_price: cluster.min_price,
            max_price: cluster.max_price,
            centroid_latitude: cluster.centroid_location.latitude,
            centroid_longitude: cluster.centroid_location.longitude,
            centroid_x: cluster.centroid.x,
            centroid_y: cluster.centroid.y,
        }
    }
}

/// The per-listing table has one distance column per landmark, so it is
/// written record by record rather than through serde.
fn write_listing_table(
    path: &Path,
    summary: &AnalysisSummary,
    config: &CityConfig,
) -> Result<(), ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: path.display().to_string(),
        source: e,
    };

    let mut writer = csv::Writer::from_writer(create(path)?);

    let mut header: Vec<String> = [
        "id",
        "latitude",
        "longitude",
        "x",
        "y",
        "price",
        "room_type",
        "neighbourhood",
        "neighbourhood_group",
        "tier",
        "cluster_id",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    header.extend(
        config
            .landmarks
            .iter()
            .map(|l| format!("dist_to_{}", column_name(&l.name))),
    );
    header.push("nearest_landmark_m".to_string());
    writer.write_record(&header).map_err(csv_err)?;

    for row in &summary.listings {
        let mut record = vec![
            row.id.clone(),
            row.latitude.to_string(),
            row.longitude.to_string(),
            format!("{:.2}", row.x),
            format!("{:.2}", row.y),
            row.price.to_string(),
            row.room_type.to_string(),
            row.neighborhood.clone(),
            row.neighborhood_group.clone().unwrap_or_default(),
            row.tier.clone().unwrap_or_default(),
            row.cluster_id.map(|id| id.to_string()).unwrap_or_default(),
        ];
        record.extend(row.landmark_distances.iter().map(|d| format!("{:.1}", d.meters)));
        record.push(
            row.nearest_landmark_meters
                .map(|m| format!("{m:.1}"))
                .unwrap_or_default(),
        );
        writer.write_record(&record).map_err(csv_err)?;
    }

    writer.flush().map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// `"Times Square"` becomes `times_square`.
fn column_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Cluster centroids and landmarks as point features.
fn hotspot_features(summary: &AnalysisSummary, config: &CityConfig) -> FeatureCollection {
    let clusters = summary.tiers.iter().flat_map(|t| &t.clusters).map(|c| {
        let mut properties = JsonObject::new();
        properties.insert("kind".to_string(), "cluster".into());
        properties.insert("tier".to_string(), c.tier.clone().into());
        properties.insert("clusterId".to_string(), c.cluster_id.into());
        properties.insert("listingCount".to_string(), c.listing_count.into());
        properties.insert("averagePrice".to_string(), c.average_price.into());
        properties.insert("totalValue".to_string(), c.total_value.into());
        point_feature(
            c.centroid_location.longitude,
            c.centroid_location.latitude,
            properties,
        )
    });

    let landmarks = config.landmarks.iter().map(|l| {
        let mut properties = JsonObject::new();
        properties.insert("kind".to_string(), "landmark".into());
        properties.insert("name".to_string(), l.name.clone().into());
        point_feature(l.longitude, l.latitude, properties)
    });

    FeatureCollection {
        bbox: None,
        features: clusters.chain(landmarks).collect(),
        foreign_members: None,
    }
}

fn point_feature(longitude: f64, latitude: f64, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![longitude, latitude]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use hotspot_analysis::{AnalysisOptions, analyze, progress::null_progress};
    use hotspot_city::registry::find_city;
    use hotspot_listing_models::RawListing;

    use super::*;

    #[test]
    fn file_names_carry_city_date_and_threshold() {
        let files = OutputFiles::new(Path::new("out"), "nyc", "2024-06-01", 200.0);
        assert_eq!(
            files.path("summary", "json"),
            Path::new("out/nyc_2024-06-01_min200_summary.json")
        );
        let files = OutputFiles::new(Path::new("out"), "paris", "2024-06-01", 149.5);
        assert_eq!(
            files.path("premium_clusters", "csv"),
            Path::new("out/paris_2024-06-01_min149.5_premium_clusters.csv")
        );
    }

    #[test]
    fn column_names_are_snake_case() {
        assert_eq!(column_name("Times Square"), "times_square");
        assert_eq!(column_name("Musée d'Orsay"), "mus_e_d_orsay");
    }

    #[test]
    fn writes_every_file() {
        let config = find_city("nyc").unwrap();
        let raw: Vec<RawListing> = (0..12u32)
            .map(|i| RawListing {
                id: Some(format!("l{i}")),
                latitude: Some(f64::from(i).mul_add(0.0001, 40.7580)),
                longitude: Some(-73.9855),
                price: Some(300.0),
                neighborhood: Some("Midtown".to_string()),
                ..RawListing::default()
            })
            .collect();
        let summary =
            analyze(&raw, &config, &AnalysisOptions::default(), &null_progress()).unwrap();

        let dir = std::env::temp_dir().join(format!("hotspot_export_{}", std::process::id()));
        let files = OutputFiles::new(&dir, "nyc", "2024-06-01", summary.premium_threshold);
        let written = write_all(&files, &summary, &config).unwrap();

        assert_eq!(written.len(), 3 + summary.tiers.len());
        assert!(written.iter().all(|p| p.exists()));

        let table = std::fs::read_to_string(files.path("analyzed_data", "csv")).unwrap();
        let header = table.lines().next().unwrap();
        assert!(header.contains("dist_to_times_square"));
        assert_eq!(table.lines().count(), 13);

        let geojson = std::fs::read_to_string(files.path("hotspots", "geojson")).unwrap();
        let parsed: geojson::GeoJson = geojson.parse().unwrap();
        let geojson::GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.features.len(), 1 + config.landmarks.len());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
