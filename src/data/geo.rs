use crate::error::DataError;
use geo::{Contains, LineString, MultiPolygon, Point};
use geojson::{Feature, GeoJson, JsonValue, PolygonType, Value};
use serde::Deserialize;
use tracing::warn;

/// A closed ring of (lon, lat) coordinates
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring followed by any holes
pub type Polygon = Vec<Ring>;

/// Names of the feature properties read from the boundary file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    pub rate: String,
    pub department: String,
    pub municipality: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            rate: "tasa_homicidios".to_string(),
            department: "departamento".to_string(),
            municipality: "municipio".to_string(),
        }
    }
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// An inverted box that any point extends
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_lon <= self.max_lon && self.min_lat <= self.max_lat
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

/// A municipal boundary with its homicide rate, if the source had one
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub department: Option<String>,
    pub municipality: Option<String>,
    pub rate: Option<f64>,
    pub polygons: Vec<Polygon>,
    pub bbox: Bounds,
    /// The same polygons as `geo` geometry, for containment queries
    shape: MultiPolygon<f64>,
}

impl GeoFeature {
    /// Build a feature from polygons, computing its bounding box
    pub fn new(
        department: Option<String>,
        municipality: Option<String>,
        rate: Option<f64>,
        polygons: Vec<Polygon>,
    ) -> Self {
        let mut bbox = Bounds::empty();
        for ring in polygons.iter().flatten() {
            for &(lon, lat) in ring {
                bbox.extend(lon, lat);
            }
        }
        let shape = to_multi_polygon(&polygons);
        Self {
            department,
            municipality,
            rate,
            polygons,
            bbox,
            shape,
        }
    }

    /// Whether the point lies strictly inside the feature (holes excluded)
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.shape.contains(&Point::new(lon, lat))
    }

    pub fn in_department(&self, department: &str) -> bool {
        self.department.as_deref().map(str::trim) == Some(department.trim())
    }

    pub fn is_municipality(&self, department: &str, municipality: &str) -> bool {
        self.in_department(department)
            && self.municipality.as_deref().map(str::trim) == Some(municipality.trim())
    }
}

/// Parse a GeoJSON FeatureCollection. The buffer is used as scratch space by simd-json.
pub fn parse_features(bytes: &mut [u8], names: &PropertyNames) -> Result<Vec<GeoFeature>, DataError> {
    let geojson: GeoJson =
        simd_json::serde::from_slice(bytes).map_err(|e| DataError::GeoJson(e.to_string()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(DataError::GeoJson("expected a FeatureCollection".to_string())),
    };

    let mut features = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.iter().enumerate() {
        let rate = rate_property(feature, &names.rate).map_err(|message| {
            DataError::GeoJson(format!("feature {}: {}", idx, message))
        })?;

        let polygons = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => vec![convert_polygon(rings)],
            Some(Value::MultiPolygon(polygons)) => polygons.iter().map(convert_polygon).collect(),
            Some(_) => {
                warn!(feature = idx, "skipping feature with non-polygon geometry");
                continue;
            }
            None => {
                warn!(feature = idx, "skipping feature without geometry");
                continue;
            }
        };

        let geo = GeoFeature::new(
            text_property(feature, &names.department),
            text_property(feature, &names.municipality),
            rate,
            polygons,
        );

        if !geo.bbox.is_valid() {
            warn!(feature = idx, "skipping feature with empty geometry");
            continue;
        }

        features.push(geo);
    }

    Ok(features)
}

/// Absent or null means no data; anything else must be a finite number
fn rate_property(feature: &Feature, name: &str) -> Result<Option<f64>, String> {
    match feature.property(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(rate) if rate.is_finite() => Ok(Some(rate)),
            _ => Err(format!("'{}' is not a number: {}", name, value)),
        },
    }
}

fn text_property(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_multi_polygon(polygons: &[Polygon]) -> MultiPolygon<f64> {
    polygons
        .iter()
        .filter_map(|rings| {
            let (exterior, holes) = rings.split_first()?;
            Some(geo::Polygon::new(
                LineString::from(exterior.clone()),
                holes.iter().cloned().map(LineString::from).collect(),
            ))
        })
        .collect()
}

fn convert_polygon(rings: &PolygonType) -> Polygon {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|c| c.len() >= 2)
                .map(|c| (c[0], c[1]))
                .collect()
        })
        .collect()
}
