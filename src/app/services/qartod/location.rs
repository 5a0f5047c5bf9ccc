//! Location test
//!
//! Checks that each position fix lies inside an allowed region and that the
//! great-circle jump from the previous fix is physically plausible.

use crate::app::models::{FlagSeries, QartodFlag, check_len};
use crate::constants::{DEFAULT_BBOX, EARTH_RADIUS_METERS};
use crate::{Error, Result};
use serde::Deserialize;
use tracing::debug;

/// Longitude/latitude bounding box, bounds included
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "[f64; 4]")]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Create a box from `(min_lon, min_lat, max_lon, max_lat)`
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let bounds = [min_lon, min_lat, max_lon, max_lat];
        if bounds.iter().any(|b| b.is_nan()) {
            return Err(Error::configuration(format!(
                "Bounding box bounds must not be NaN, got {:?}",
                bounds
            )));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(Error::configuration(format!(
                "Bounding box minimum exceeds maximum: {:?}",
                bounds
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Check if a point lies inside the box
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        let (min_lon, min_lat, max_lon, max_lat) = DEFAULT_BBOX;
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = Error;

    fn try_from(b: [f64; 4]) -> Result<Self> {
        BoundingBox::new(b[0], b[1], b[2], b[3])
    }
}

/// Simple polygon of `(lon, lat)` vertices; the ring closes implicitly
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>")]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    /// Create a polygon from at least three finite vertices
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::configuration(format!(
                "Polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices
            .iter()
            .any(|(lon, lat)| !lon.is_finite() || !lat.is_finite())
        {
            return Err(Error::configuration(
                "Polygon vertices must be finite".to_string(),
            ));
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Even-odd ray casting containment test
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for i in 0..self.vertices.len() {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

impl TryFrom<Vec<[f64; 2]>> for Polygon {
    type Error = Error;

    fn try_from(vertices: Vec<[f64; 2]>) -> Result<Self> {
        Polygon::new(vertices.into_iter().map(|[lon, lat]| (lon, lat)).collect())
    }
}

/// Validated location test parameters
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "LocationSettings")]
pub struct LocationConfig {
    bbox: BoundingBox,
    polygon: Option<Polygon>,
    range_max: Option<f64>,
}

/// Unvalidated location parameters as read from a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct LocationSettings {
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub polygon: Option<Polygon>,
    #[serde(default)]
    pub range_max: Option<f64>,
}

impl LocationConfig {
    /// Create a configuration accepting any position on the globe
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict fixes to a bounding box
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Restrict fixes to a polygon, in addition to the bounding box
    pub fn with_polygon(mut self, polygon: Polygon) -> Self {
        self.polygon = Some(polygon);
        self
    }

    /// Largest allowed distance in meters between consecutive fixes
    pub fn with_range_max(mut self, meters: f64) -> Result<Self> {
        if !meters.is_finite() || meters < 0.0 {
            return Err(Error::configuration(format!(
                "Maximum range must be finite and non-negative, got {}",
                meters
            )));
        }
        self.range_max = Some(meters);
        Ok(self)
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    pub fn range_max(&self) -> Option<f64> {
        self.range_max
    }

    fn in_region(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat) && self.polygon.as_ref().is_none_or(|p| p.contains(lon, lat))
    }
}

impl TryFrom<LocationSettings> for LocationConfig {
    type Error = Error;

    fn try_from(settings: LocationSettings) -> Result<Self> {
        let mut config = Self::new().with_bbox(settings.bbox.unwrap_or_default());
        if let Some(polygon) = settings.polygon {
            config = config.with_polygon(polygon);
        }
        match settings.range_max {
            Some(meters) => config.with_range_max(meters),
            None => Ok(config),
        }
    }
}

/// Haversine great-circle distance in meters between two points in degrees
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
}

/// Run the location test over index-aligned longitudes and latitudes
pub fn location_test(
    lon: &[Option<f64>],
    lat: &[Option<f64>],
    config: &LocationConfig,
) -> Result<FlagSeries> {
    check_len("lat", lon.len(), lat.len())?;

    let mut previous: Option<(f64, f64)> = None;
    let flags: FlagSeries = lon
        .iter()
        .zip(lat)
        .map(|pair| match pair {
            (None, None) => QartodFlag::Unknown,
            // Half a fix is malformed
            (Some(_), None) | (None, Some(_)) => QartodFlag::Fail,
            (Some(x), Some(y)) => {
                let (x, y) = (*x, *y);
                if !x.is_finite() || !y.is_finite() {
                    return QartodFlag::Fail;
                }
                let jump = previous.map(|(px, py)| great_circle_distance(py, px, y, x));
                previous = Some((x, y));

                let too_far = matches!((jump, config.range_max), (Some(d), Some(max)) if d > max);
                if !config.in_region(x, y) || too_far {
                    QartodFlag::Fail
                } else {
                    QartodFlag::Good
                }
            }
        })
        .collect();

    debug!(
        "Location test: {} fixes, {} FAIL, {} UNKNOWN",
        flags.len(),
        flags.count(QartodFlag::Fail),
        flags.count(QartodFlag::Unknown)
    );

    Ok(flags)
}
