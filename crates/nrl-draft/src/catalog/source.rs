// Catalog sources: the backend's `/data` endpoint, or a local JSON/CSV export.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::player::RawPlayer;
use super::Catalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog from {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("catalog payload is not a player array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error in catalog: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the player catalog comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    /// `GET {base_url}/data` returning a JSON array of player records.
    Http { base_url: String, timeout: Duration },
    JsonFile(PathBuf),
    CsvFile(PathBuf),
}

impl CatalogSource {
    /// Pick a source from a location string: URLs go over HTTP, `.csv` paths
    /// are read as CSV, anything else as a JSON file.
    pub fn from_location(location: &str, timeout: Duration) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            CatalogSource::Http {
                base_url: location.trim_end_matches('/').to_string(),
                timeout,
            }
        } else if Path::new(location)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            CatalogSource::CsvFile(PathBuf::from(location))
        } else {
            CatalogSource::JsonFile(PathBuf::from(location))
        }
    }

    pub async fn fetch(&self) -> Result<Catalog, CatalogError> {
        match self {
            CatalogSource::Http { base_url, timeout } => {
                let url = format!("{base_url}/data");
                let text = fetch_text(&url, *timeout)
                    .await
                    .map_err(|source| CatalogError::Http {
                        url: url.clone(),
                        source,
                    })?;
                parse_json(&text)
            }
            CatalogSource::JsonFile(path) => {
                let text = read_file(path)?;
                parse_json(&text)
            }
            CatalogSource::CsvFile(path) => {
                let text = read_file(path)?;
                parse_csv(text.as_bytes())
            }
        }
    }

    /// Fetch the catalog, degrading to an empty one on any failure.
    pub async fn fetch_or_empty(&self) -> Catalog {
        match self.fetch().await {
            Ok(catalog) => {
                info!("Loaded {} players into catalog", catalog.len());
                catalog
            }
            Err(e) => {
                warn!("Catalog unavailable, continuing with no players: {e}");
                Catalog::empty()
            }
        }
    }
}

async fn fetch_text(url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    client.get(url).send().await?.error_for_status()?.text().await
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a JSON array of raw player records.
pub fn parse_json(text: &str) -> Result<Catalog, CatalogError> {
    let records: Vec<RawPlayer> = serde_json::from_str(text)?;
    Ok(Catalog::from_raw(records))
}

/// Flat CSV export row. Every column is optional text; numeric parsing and
/// defaulting happen in [`RawPlayer::into_player`].
#[derive(Debug, Deserialize)]
struct CsvPlayerRow {
    id: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    positions: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    games_played: Option<String>,
    #[serde(default)]
    total_points: Option<String>,
    #[serde(default)]
    avg_points: Option<String>,
    #[serde(default)]
    career_avg: Option<String>,
    #[serde(default)]
    adp: Option<String>,
}

impl From<CsvPlayerRow> for RawPlayer {
    fn from(row: CsvPlayerRow) -> Self {
        let text = |v: Option<String>| v.map(Value::String).unwrap_or(Value::Null);
        RawPlayer {
            id: text(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            positions: text(row.positions),
            status: row.status,
            stats: Some(super::player::RawStats {
                games_played: text(row.games_played),
                total_points: text(row.total_points),
                avg_points: text(row.avg_points),
                career_avg: text(row.career_avg),
                adp: text(row.adp),
            }),
        }
    }
}

/// Parse a CSV export with a header row.
pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<Catalog, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvPlayerRow>() {
        records.push(RawPlayer::from(row?));
    }
    Ok(Catalog::from_raw(records))
}
