//! Campus data from a GeoJSON `FeatureCollection`.
//!
//! Features are classified by geometry type and an optional `role` property:
//!
//! | geometry | role | becomes |
//! |---|---|---|
//! | (Multi)Polygon | `floor` | indoor floor outline |
//! | (Multi)Polygon | other | campus outline (first one wins) |
//! | (Multi)LineString | `corridor` | indoor corridor |
//! | (Multi)LineString | other | campus path |
//! | Point | `room` | indoor room (needs `name`) |
//! | Point | other | named location (needs `name`) |
//!
//! Anything malformed is skipped with a warning.

use std::path::Path;

use geojson::{Feature, GeoJson, Value};
use log::{info, warn};

use crate::Error;
use crate::geometry::{Boundary, GeoPoint};
use crate::indoor::{IndoorMap, IndoorRoom};
use crate::locations::NamedLocation;
use crate::route::CampusData;

#[derive(Debug, Clone, Default)]
pub struct CampusFeatures {
    pub campus: Option<Boundary>,
    pub floor: Option<Boundary>,
    pub paths: Vec<Vec<GeoPoint>>,
    pub corridors: Vec<Vec<GeoPoint>>,
    pub rooms: Vec<IndoorRoom>,
    pub locations: Vec<NamedLocation>,
}

impl CampusFeatures {
    /// Builds the routing inputs. Named points are returned separately for
    /// the location directory.
    pub fn into_campus_data(self) -> (CampusData, Vec<NamedLocation>) {
        let mut data = CampusData::new();
        if let Some(campus) = self.campus {
            data = data.with_campus(campus);
        }
        if !self.paths.is_empty() {
            data = data.with_paths(&self.paths);
        }
        match self.floor {
            Some(floor) => {
                data = data.with_indoor(IndoorMap::new(floor, self.rooms, &self.corridors));
            }
            None if !self.rooms.is_empty() => {
                warn!("{} indoor rooms ignored: no floor outline", self.rooms.len());
            }
            None => {}
        }
        (data, self.locations)
    }
}

pub fn parse_campus_geojson(content: &str) -> Result<CampusFeatures, Error> {
    let features = match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(Error::InvalidData(
                "expected a Feature or FeatureCollection".to_string(),
            ));
        }
    };

    let mut out = CampusFeatures::default();
    for feature in &features {
        classify(feature, &mut out);
    }

    info!(
        "Campus GeoJSON: outline {}, floor {}, {} paths, {} corridors, {} rooms, {} locations",
        out.campus.is_some(),
        out.floor.is_some(),
        out.paths.len(),
        out.corridors.len(),
        out.rooms.len(),
        out.locations.len()
    );
    Ok(out)
}

pub fn load_campus_geojson(path: &Path) -> Result<CampusFeatures, Error> {
    info!("Reading campus GeoJSON: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_campus_geojson(&content)
}

fn classify(feature: &Feature, out: &mut CampusFeatures) {
    let Some(geometry) = &feature.geometry else {
        return;
    };
    let role = string_property(feature, "role").unwrap_or_default();
    let name = string_property(feature, "name");

    match &geometry.value {
        Value::Polygon(rings) => add_outline(rings, &role, out),
        Value::MultiPolygon(polygons) => {
            if let Some(rings) = polygons.first() {
                add_outline(rings, &role, out);
            }
        }
        Value::LineString(line) => add_line(line, &role, out),
        Value::MultiLineString(lines) => {
            for line in lines {
                add_line(line, &role, out);
            }
        }
        Value::Point(position) => {
            let (Some(point), Some(name)) = (to_point(position), name) else {
                warn!("Skipping point feature without a name or valid coordinates");
                return;
            };
            if role == "room" {
                let id = string_property(feature, "id").unwrap_or_else(|| name.clone());
                out.rooms.push(IndoorRoom { id, name, point });
            } else {
                out.locations.push(NamedLocation::new(name, point));
            }
        }
        _ => {}
    }
}

fn add_outline(rings: &[Vec<Vec<f64>>], role: &str, out: &mut CampusFeatures) {
    let Some(exterior) = rings.first().and_then(|ring| to_line(ring)) else {
        warn!("Skipping polygon with invalid coordinates");
        return;
    };
    let boundary = Boundary::new(exterior);
    if !boundary.is_valid() {
        warn!("Skipping polygon with {} vertices", boundary.vertices().len());
        return;
    }

    let slot = if role == "floor" { &mut out.floor } else { &mut out.campus };
    if slot.is_some() {
        warn!("Ignoring extra {} outline", if role == "floor" { "floor" } else { "campus" });
    } else {
        *slot = Some(boundary);
    }
}

fn add_line(line: &[Vec<f64>], role: &str, out: &mut CampusFeatures) {
    match to_line(line) {
        Some(points) if points.len() >= 2 => {
            if role == "corridor" {
                out.corridors.push(points);
            } else {
                out.paths.push(points);
            }
        }
        _ => warn!("Skipping line with fewer than two valid positions"),
    }
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(|value| value.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// GeoJSON positions are `[lon, lat, ...]`.
fn to_point(position: &[f64]) -> Option<GeoPoint> {
    match position {
        [lon, lat, ..] => Some(GeoPoint::new(*lat, *lon)).filter(GeoPoint::is_valid),
        _ => None,
    }
}

fn to_line(positions: &[Vec<f64>]) -> Option<Vec<GeoPoint>> {
    positions.iter().map(|p| to_point(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::route::{Destination, RouteTier, synthesize};

    const CAMPUS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"role": "campus", "name": "SJEC"},
             "geometry": {"type": "Polygon", "coordinates": [[
                [74.895, 12.905], [74.905, 12.905], [74.905, 12.915], [74.895, 12.915], [74.895, 12.905]
             ]]}},
            {"type": "Feature", "properties": {"role": "floor"},
             "geometry": {"type": "Polygon", "coordinates": [[
                [74.899, 12.909], [74.900, 12.909], [74.900, 12.910], [74.899, 12.910], [74.899, 12.909]
             ]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[74.896, 12.906], [74.904, 12.914]]}},
            {"type": "Feature", "properties": {"role": "corridor"},
             "geometry": {"type": "LineString", "coordinates": [[74.8993, 12.9092], [74.8998, 12.9098]]}},
            {"type": "Feature", "properties": {"role": "room", "name": "Seminar Hall", "id": "sh-1"},
             "geometry": {"type": "Point", "coordinates": [74.8998, 12.9098]}},
            {"type": "Feature", "properties": {"name": "Library"},
             "geometry": {"type": "Point", "coordinates": [74.8997661, 12.9102945]}},
            {"type": "Feature", "properties": {"name": "Off the map"},
             "geometry": {"type": "Point", "coordinates": [200.0, 12.9]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [74.9, 12.91]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[74.0, 12.0], [74.1, 12.0]]]}},
            {"type": "Feature", "properties": {"name": "No geometry"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_features_are_classified() {
        let features = parse_campus_geojson(CAMPUS).unwrap();

        assert_eq!(features.campus.as_ref().unwrap().vertices().len(), 4);
        assert!(features.floor.is_some());
        assert_eq!(features.paths.len(), 1);
        assert_eq!(features.corridors.len(), 1);
        assert_eq!(features.rooms.len(), 1);
        assert_eq!(features.rooms[0].id, "sh-1");
        assert_eq!(features.locations.len(), 1);
        assert_eq!(features.locations[0].area_name, "Library");
        assert_eq!(features.paths[0][0], GeoPoint::new(12.906, 74.896));
    }

    #[test]
    fn test_loaded_data_routes_indoors() {
        let (data, locations) = parse_campus_geojson(CAMPUS).unwrap().into_campus_data();
        assert!(data.campus.is_some());
        assert!(data.paths.is_some());
        assert_eq!(data.indoor.as_ref().unwrap().rooms().count(), 1);
        assert_eq!(locations.len(), 1);

        let route = synthesize(
            &data,
            &RoutingConfig::default(),
            GeoPoint::new(12.9092, 74.8992),
            &Destination::named("Seminar Hall", GeoPoint::new(12.9098, 74.8998)),
        )
        .unwrap();
        assert_eq!(route.tier, RouteTier::Indoor);
    }

    #[test]
    fn test_bare_geometry_is_rejected() {
        let err = parse_campus_geojson(r#"{"type": "Point", "coordinates": [74.9, 12.9]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
        assert!(parse_campus_geojson("not geojson").is_err());
    }
}
