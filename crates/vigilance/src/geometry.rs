//! Department boundary geometry: GeoJSON parsing and the extent numbers
//! the icon scaler feeds on.

use serde::Deserialize;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two (lat, lon) points.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureProperties {
    pub code: String,
    pub nom: String,
}

/// Polygon ring coordinates are [lon, lat] pairs per GeoJSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

/// A parsed region outline reduced to the numbers rendering needs.
#[derive(Debug, Clone)]
pub struct RegionShape {
    pub code: String,
    pub name: String,
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl RegionShape {
    /// Folds all rings of a feature into a bounding box. Returns `None`
    /// for features with no coordinates at all.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let mut shape = RegionShape {
            code: feature.properties.code.clone(),
            name: feature.properties.nom.clone(),
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };

        let mut seen = false;
        match &feature.geometry {
            Geometry::Polygon { coordinates } => {
                for ring in coordinates {
                    for &[lon, lat] in ring {
                        shape.extend(lat, lon);
                        seen = true;
                    }
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        for &[lon, lat] in ring {
                            shape.extend(lat, lon);
                            seen = true;
                        }
                    }
                }
            }
        }

        seen.then_some(shape)
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    /// Bounding box center as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Physical extent: great-circle distance from the southwest corner
    /// of the bounding box to the northeast corner, in meters.
    pub fn diagonal_m(&self) -> f64 {
        haversine_m(self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}

/// Parse a department boundary GeoJSON file into shapes, skipping empty
/// features.
pub fn parse_regions(geojson: &str) -> Result<Vec<RegionShape>, serde_json::Error> {
    let collection: FeatureCollection = serde_json::from_str(geojson)?;
    Ok(collection
        .features
        .iter()
        .filter_map(RegionShape::from_feature)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        assert!(haversine_m(48.85, 2.35, 48.85, 2.35) < 1e-6);
    }

    #[test]
    fn test_haversine_paris_marseille() {
        // Paris to Marseille is about 660 km great-circle.
        let d = haversine_m(48.8566, 2.3522, 43.2965, 5.3698);
        assert!((d - 660_000.0).abs() < 10_000.0, "got {d}");
    }

    #[test]
    fn test_parse_polygon_feature() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"code": "75", "nom": "Paris"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.22, 48.81], [2.47, 48.81], [2.47, 48.90], [2.22, 48.90], [2.22, 48.81]]]
                }
            }]
        }"#;

        let shapes = parse_regions(geojson).unwrap();
        assert_eq!(shapes.len(), 1);
        let shape = &shapes[0];
        assert_eq!(shape.code, "75");
        let (lat, lon) = shape.center();
        assert!((lat - 48.855).abs() < 1e-9);
        assert!((lon - 2.345).abs() < 1e-9);
        assert!(shape.diagonal_m() > 0.0);
    }

    #[test]
    fn test_multipolygon_spans_all_parts() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"code": "2A", "nom": "Corse-du-Sud"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[8.5, 41.4], [8.6, 41.4], [8.6, 41.5], [8.5, 41.4]]],
                        [[[9.0, 41.9], [9.1, 41.9], [9.1, 42.0], [9.0, 41.9]]]
                    ]
                }
            }]
        }"#;

        let shapes = parse_regions(geojson).unwrap();
        let shape = &shapes[0];
        let (lat, lon) = shape.center();
        assert!((lat - 41.7).abs() < 1e-9);
        assert!((lon - 8.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_feature_skipped() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"code": "00", "nom": "Vide"},
                "geometry": {"type": "Polygon", "coordinates": []}
            }]
        }"#;
        assert!(parse_regions(geojson).unwrap().is_empty());
    }
}
