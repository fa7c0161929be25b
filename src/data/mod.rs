mod geo;
mod tabular;

pub use self::geo::{Bounds, GeoFeature, Polygon, PropertyNames, Ring};

use crate::error::DataError;
use serde::Deserialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// One row of the tabular input: a municipality and its 2024 homicide figures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MunicipalRecord {
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "homicidios")]
    pub homicides: u64,
    #[serde(rename = "poblacion")]
    pub population: u64,
    /// Homicides per 100,000 inhabitants, as published in the source file
    #[serde(rename = "tasa_homicidios")]
    pub rate: f64,
}

impl MunicipalRecord {
    pub fn new(department: &str, municipality: &str, homicides: u64, population: u64, rate: f64) -> Self {
        Self {
            department: department.to_string(),
            municipality: municipality.to_string(),
            homicides,
            population,
            rate,
        }
    }

    /// Department name used for grouping and comparison
    #[inline]
    pub fn department_key(&self) -> &str {
        self.department.trim()
    }

    /// Municipality name used for lookup and boundary matching
    #[inline]
    pub fn municipality_key(&self) -> &str {
        self.municipality.trim()
    }
}

/// The immutable, non-empty set of municipal records, in source order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<MunicipalRecord>,
}

impl Dataset {
    pub fn new(records: Vec<MunicipalRecord>) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::Empty);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[MunicipalRecord] {
        &self.records
    }

    /// Records whose trimmed department name equals `department` (also trimmed).
    /// The iterator borrows only the dataset.
    pub(crate) fn in_department<'a>(
        &'a self,
        department: &str,
    ) -> impl Iterator<Item = &'a MunicipalRecord> + 'a {
        let key = department.trim().to_string();
        self.records.iter().filter(move |r| r.department_key() == key)
    }
}

/// Load the municipal CSV into a dataset
pub fn load_dataset(path: &Path) -> Result<Dataset, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = tabular::read_records(file)?;
    info!(path = %path.display(), records = records.len(), "loaded municipal records");
    Dataset::new(records)
}

/// Load municipal boundaries from a GeoJSON FeatureCollection
pub fn load_features(path: &Path, names: &PropertyNames) -> Result<Vec<GeoFeature>, DataError> {
    let mut bytes = fs::read(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let features = geo::parse_features(&mut bytes, names)?;
    let with_rate = features.iter().filter(|f| f.rate.is_some()).count();
    info!(
        path = %path.display(),
        features = features.len(),
        with_rate,
        "loaded municipal boundaries"
    );
    Ok(features)
}
