//! GeoJSON site collections.
//!
//! Reads Polygon, MultiPolygon (first polygon only) and Point features. Known properties
//! become typed site attributes, other numeric properties are treated as columns appended
//! by an earlier stage, and everything else is carried through untouched.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::errors::{InputError, InputResult};
use crate::models::site::{Site, SiteDistances, SitePotentials};
use crate::utils::geometry::{GeoPoint, Geometry};
use crate::utils::logging::{self, FileIOType, OperationCategory};

const SITE_ID: &str = "site_id";
const COUNTRY: &str = "country";
const WATERBODY_DIST: &str = "waterbody_dist";
const WATERWAY_DIST: &str = "waterway_dist";
const OCEAN_DIST: &str = "ocean_dist";
const GRID_DIST: &str = "grid_dist";
const ROAD_DIST: &str = "road_dist";
const THEO_PV: &str = "theo_pv";
const THEO_WIND: &str = "theo_wind";

const RESERVED: [&str; 9] = [
    SITE_ID, COUNTRY, WATERBODY_DIST, WATERWAY_DIST, OCEAN_DIST, GRID_DIST, ROAD_DIST, THEO_PV, THEO_WIND,
];

type Position = Vec<f64>;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

fn to_point(position: &[f64], site: &str) -> InputResult<GeoPoint> {
    match position {
        [lon, lat, ..] => Ok(GeoPoint::new(*lon, *lat)),
        _ => Err(InputError::InvalidGeometry {
            site: site.to_string(),
            reason: "position with fewer than two coordinates".to_string(),
        }),
    }
}

fn to_ring(ring: &[Position], site: &str) -> InputResult<Geometry> {
    if ring.is_empty() {
        return Err(InputError::InvalidGeometry {
            site: site.to_string(),
            reason: "empty exterior ring".to_string(),
        });
    }
    let points = ring.iter().map(|p| to_point(p, site)).collect::<InputResult<Vec<_>>>()?;
    Ok(Geometry::Polygon(points))
}

fn convert_geometry(geometry: Option<RawGeometry>, site: &str) -> InputResult<Geometry> {
    let invalid = |reason: &str| InputError::InvalidGeometry {
        site: site.to_string(),
        reason: reason.to_string(),
    };

    match geometry {
        None => Err(invalid("missing geometry")),
        Some(RawGeometry::Point { coordinates }) => Ok(Geometry::Point(to_point(&coordinates, site)?)),
        Some(RawGeometry::Polygon { coordinates }) => {
            let exterior = coordinates.first().ok_or_else(|| invalid("polygon without rings"))?;
            to_ring(exterior, site)
        }
        Some(RawGeometry::MultiPolygon { coordinates }) => {
            let exterior = coordinates
                .first()
                .and_then(|polygon| polygon.first())
                .ok_or_else(|| invalid("multipolygon without polygons"))?;
            to_ring(exterior, site)
        }
        Some(RawGeometry::Unsupported) => Err(invalid("unsupported geometry type")),
    }
}

fn optional_number(properties: &Map<String, Value>, key: &str, site: &str) -> InputResult<Option<f64>> {
    match properties.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(InputError::InvalidNumber {
            table: format!("site {}", site),
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Explicit `site_id`, or `None` when the feature has none
fn site_id(properties: &Map<String, Value>) -> InputResult<Option<u64>> {
    let id = match properties.get(SITE_ID) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| v.fract() == 0.0 && *v >= 0.0).map(|v| v as u64))
            .ok_or_else(|| InputError::InvalidNumber {
                table: "sites".to_string(),
                key: SITE_ID.to_string(),
                value: n.to_string(),
            }),
        Some(Value::String(s)) => s.parse::<u64>().map_err(|_| InputError::InvalidNumber {
            table: "sites".to_string(),
            key: SITE_ID.to_string(),
            value: s.clone(),
        }),
        Some(other) => Err(InputError::InvalidNumber {
            table: "sites".to_string(),
            key: SITE_ID.to_string(),
            value: other.to_string(),
        }),
    };
    id.map(Some)
}

/// Features without an id are numbered by their position in the collection
fn parse_feature(feature: Feature, id: u64) -> InputResult<Site> {
    let properties = feature.properties.unwrap_or_default();
    let label = id.to_string();

    let geometry = convert_geometry(feature.geometry, &label)?;
    let country = properties
        .get(COUNTRY)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let distances = SiteDistances {
        waterbody: optional_number(&properties, WATERBODY_DIST, &label)?,
        waterway: optional_number(&properties, WATERWAY_DIST, &label)?,
        ocean: optional_number(&properties, OCEAN_DIST, &label)?,
        grid: optional_number(&properties, GRID_DIST, &label)?,
        road: optional_number(&properties, ROAD_DIST, &label)?,
    };
    let potentials = SitePotentials {
        solar: optional_number(&properties, THEO_PV, &label)?,
        wind: optional_number(&properties, THEO_WIND, &label)?,
    };

    let mut site = Site::new(id, geometry, country, distances).with_potentials(potentials);
    for (key, value) in properties {
        if RESERVED.contains(&key.as_str()) {
            continue;
        }
        match value.as_f64() {
            Some(number) => site.append_column(key, number),
            None => site.insert_passthrough(key, value),
        }
    }
    Ok(site)
}

pub fn parse_sites<R: Read>(source: R, origin: &Path) -> InputResult<Vec<Site>> {
    let collection: FeatureCollection = serde_json::from_reader(source).map_err(|source| InputError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    let ids = collection
        .features
        .iter()
        .map(|feature| feature.properties.as_ref().map_or(Ok(None), site_id))
        .collect::<InputResult<Vec<_>>>()?;
    if ids.iter().any(Option::is_some) {
        if let Some(index) = ids.iter().position(Option::is_none) {
            return Err(InputError::MixedSiteIds { path: origin.to_path_buf(), index });
        }
    }

    let mut seen = BTreeSet::new();
    let mut sites = Vec::with_capacity(collection.features.len());
    for (index, (feature, id)) in collection.features.into_iter().zip(ids).enumerate() {
        let site = parse_feature(feature, id.unwrap_or(index as u64))?;
        if !seen.insert(site.get_id()) {
            return Err(InputError::DuplicateKey {
                table: origin.display().to_string(),
                key: site.get_id().to_string(),
            });
        }
        sites.push(site);
    }
    Ok(sites)
}

pub fn load_sites(path: &Path) -> InputResult<Vec<Site>> {
    let _timing = logging::start_timing("load_sites",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let file = File::open(path).map_err(|e| InputError::io(path, e))?;
    let sites = parse_sites(BufReader::new(file), path)?;
    info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

fn position(point: &GeoPoint) -> Value {
    json!([point.lon, point.lat])
}

fn geometry_json(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::Point(point) => json!({ "type": "Point", "coordinates": position(point) }),
        Geometry::Polygon(ring) => {
            let ring: Vec<Value> = ring.iter().map(position).collect();
            json!({ "type": "Polygon", "coordinates": [ring] })
        }
    }
}

fn optional(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::from)
}

/// One GeoJSON feature per site; unset values are written as null
pub fn site_feature(site: &Site) -> Value {
    let mut properties = Map::new();
    for (key, value) in site.passthrough() {
        properties.insert(key.clone(), value.clone());
    }

    let distances = site.get_distances();
    let potentials = site.get_potentials();
    properties.insert(SITE_ID.to_string(), Value::from(site.get_id()));
    properties.insert(COUNTRY.to_string(), Value::from(site.get_country()));
    properties.insert(WATERBODY_DIST.to_string(), optional(distances.waterbody));
    properties.insert(WATERWAY_DIST.to_string(), optional(distances.waterway));
    properties.insert(OCEAN_DIST.to_string(), optional(distances.ocean));
    properties.insert(GRID_DIST.to_string(), optional(distances.grid));
    properties.insert(ROAD_DIST.to_string(), optional(distances.road));
    properties.insert(THEO_PV.to_string(), optional(potentials.solar));
    properties.insert(THEO_WIND.to_string(), optional(potentials.wind));

    for (column, value) in site.columns() {
        properties.insert(column.clone(), Value::from(*value));
    }

    json!({
        "type": "Feature",
        "geometry": geometry_json(site.get_geometry()),
        "properties": Value::Object(properties),
    })
}

pub fn write_sites<W: Write>(sink: W, sites: &[Site], origin: &Path) -> InputResult<()> {
    let collection = json!({
        "type": "FeatureCollection",
        "features": sites.iter().map(site_feature).collect::<Vec<_>>(),
    });
    serde_json::to_writer(sink, &collection).map_err(|source| InputError::Json {
        path: origin.to_path_buf(),
        source,
    })
}

pub fn save_sites(path: &Path, sites: &[Site]) -> InputResult<()> {
    let _timing = logging::start_timing("save_sites",
        OperationCategory::FileIO { subcategory: FileIOType::ResultsSave });

    let file = File::create(path).map_err(|e| InputError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_sites(&mut writer, sites, path)?;
    writer.flush().map_err(|e| InputError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[15.0, -26.0], [15.5, -26.0], [15.5, -25.5], [15.0, -25.5], [15.0, -26.0]]]},
                "properties": {"site_id": 4, "country": "NA", "waterbody_dist": 12.5, "waterway_dist": null,
                               "ocean_dist": 3.0, "theo_pv": 250.0, "Lowest water cost": 0.04, "h3_index": "8a2b"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [16.0, -27.0, 120.0]},
                "properties": {"site_id": 5, "country": "NA"}
            }
        ]
    }"#;

    fn parsed() -> Vec<Site> {
        parse_sites(COLLECTION.as_bytes(), Path::new("hex.geojson")).unwrap()
    }

    #[test]
    fn known_properties_become_typed_attributes() {
        let sites = parsed();
        let first = &sites[0];

        assert_eq!(first.get_id(), 4);
        assert_eq!(first.get_country(), "NA");
        assert_eq!(first.get_distances().waterbody, Some(12.5));
        assert_eq!(first.get_distances().waterway, None);
        assert_eq!(first.get_potentials().solar, Some(250.0));
        assert_eq!(first.column("Lowest water cost"), Some(0.04));
        assert_eq!(first.passthrough().get("h3_index"), Some(&Value::from("8a2b")));

        let centroid = first.centroid().unwrap();
        assert!((centroid.lon - 15.25).abs() < 1e-12);
    }

    #[test]
    fn missing_site_ids_fall_back_to_feature_index() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [15.0, -26.0]}, "properties": {"country": "NA"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [16.0, -27.0, 120.0]}}
        ]}"#;
        let sites = parse_sites(json.as_bytes(), Path::new("hex.geojson")).unwrap();
        assert_eq!(sites[0].get_id(), 0);
        assert_eq!(sites[1].get_id(), 1);
        assert_eq!(sites[1].centroid(), Some(GeoPoint::new(16.0, -27.0)));
    }

    #[test]
    fn ids_must_be_given_for_all_features_or_none() {
        // The second feature would fall back to index 1, the first feature's id
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"site_id": 1}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}, "properties": {}}
        ]}"#;
        let err = parse_sites(json.as_bytes(), Path::new("hex.geojson")).unwrap_err();
        assert!(matches!(err, InputError::MixedSiteIds { index: 1, .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"site_id": 1}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}, "properties": {"site_id": 1}}
        ]}"#;
        let err = parse_sites(json.as_bytes(), Path::new("hex.geojson")).unwrap_err();
        assert!(matches!(err, InputError::DuplicateKey { .. }));
    }

    #[test]
    fn line_geometries_are_invalid() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}, "properties": {}}
        ]}"#;
        let err = parse_sites(json.as_bytes(), Path::new("hex.geojson")).unwrap_err();
        assert!(matches!(err, InputError::InvalidGeometry { .. }));
    }

    #[test]
    fn written_collection_reads_back_with_columns() {
        let mut sites = parsed();
        sites[1].append_column("Port distance [km]", 42.0);

        let mut buffer = Vec::new();
        write_sites(&mut buffer, &sites, Path::new("out.geojson")).unwrap();
        let again = parse_sites(buffer.as_slice(), Path::new("out.geojson")).unwrap();

        assert_eq!(again, sites);
    }
}
