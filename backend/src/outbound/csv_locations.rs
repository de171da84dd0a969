//! Location dataset adapter reading `uszips.csv`-style files.
//!
//! Required headers are `zip`, `lat`, `lng`, `city` and `state_name`; any
//! other columns are ignored. Zip codes may carry leading zeros (`00601`).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::ports::{LocationSource, LocationSourceError};
use crate::domain::{Coordinates, Location, LocationCode};

#[derive(Debug, Deserialize)]
struct CsvRow {
    zip: String,
    lat: f64,
    lng: f64,
    city: String,
    state_name: String,
}

impl CsvRow {
    fn into_location(self, line: u64) -> Result<Location, LocationSourceError> {
        let parse_error =
            |detail: String| LocationSourceError::parse(format!("line {line}: {detail}"));
        let raw_code: i64 = self
            .zip
            .trim()
            .parse()
            .map_err(|_| parse_error(format!("zip `{}` is not numeric", self.zip)))?;
        let code = LocationCode::new(raw_code).map_err(|err| parse_error(err.to_string()))?;
        let coordinates =
            Coordinates::new(self.lat, self.lng).map_err(|err| parse_error(err.to_string()))?;
        Ok(Location {
            code,
            city: self.city,
            state: self.state_name,
            coordinates,
        })
    }
}

/// Reads locations from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvLocationSource {
    path: PathBuf,
}

impl CsvLocationSource {
    /// Source backed by the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Dataset location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_locations(path: &Path) -> Result<Vec<Location>, LocationSourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| LocationSourceError::io(format!("{err} ({})", path.display())))?;

    let mut locations = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let row = record.map_err(|err| LocationSourceError::parse(err.to_string()))?;
        let line = locations.len() as u64 + 2;
        locations.push(row.into_location(line)?);
    }
    Ok(locations)
}

#[async_trait]
impl LocationSource for CsvLocationSource {
    async fn load(&self) -> Result<Vec<Location>, LocationSourceError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_locations(&path))
            .await
            .map_err(|err| LocationSourceError::io(format!("reader task failed: {err}")))?
    }
}
