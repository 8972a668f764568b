use std::collections::HashMap;
use std::path::Path;

use log::info;
use osmpbf::{Element, ElementReader};

use crate::Error;
use crate::geometry::GeoPoint;

/// Whether a way with these tags can be walked. Dedicated pedestrian ways
/// and minor roads qualify; major roads only with a sidewalk or explicit
/// foot access.
pub fn is_walkable(tags: &HashMap<&str, &str>) -> bool {
    let highway = tags.get("highway").copied().unwrap_or("");
    let foot = tags.get("foot").copied().unwrap_or("");
    let sidewalk = tags.get("sidewalk").copied().unwrap_or("");

    if foot == "no" {
        return false;
    }

    let is_walkable_type = matches!(
        highway,
        "footway" | "path" | "steps" | "pedestrian" | "living_street" | "residential" | "tertiary" | "service" | "unclassified"
    );
    let is_motor_road = matches!(highway, "motorway" | "trunk" | "primary" | "secondary");
    let foot_allowed = matches!(foot, "yes" | "designated" | "permissive");
    let has_sidewalk = matches!(sidewalk, "both" | "left" | "right" | "yes" | "separate");

    is_walkable_type || (is_motor_road && (foot_allowed || has_sidewalk))
}

/// Reads an OSM PBF extract and returns every walkable way as a polyline.
/// Way vertices missing from the extract split the way.
pub fn walkable_paths_from_pbf(path: &Path) -> Result<Vec<Vec<GeoPoint>>, Error> {
    info!("Parsing OSM PBF: {}", path.display());

    // PASS 1: Nodes
    let mut coords: HashMap<i64, GeoPoint> = HashMap::new();
    ElementReader::from_path(path)?.for_each(|element| match element {
        Element::Node(node) => {
            coords.insert(node.id(), GeoPoint::new(node.lat(), node.lon()));
        }
        Element::DenseNode(node) => {
            coords.insert(node.id(), GeoPoint::new(node.lat(), node.lon()));
        }
        _ => {}
    })?;
    info!("Loaded {} nodes. Collecting walkable ways...", coords.len());

    // PASS 2: Ways
    let mut lines = Vec::new();
    ElementReader::from_path(path)?.for_each(|element| {
        if let Element::Way(way) = element {
            let tags: HashMap<&str, &str> = way.tags().collect();
            if !is_walkable(&tags) {
                return;
            }

            let mut current = Vec::new();
            for id in way.refs() {
                match coords.get(&id) {
                    Some(point) => current.push(*point),
                    None => {
                        if current.len() >= 2 {
                            lines.push(std::mem::take(&mut current));
                        }
                        current.clear();
                    }
                }
            }
            if current.len() >= 2 {
                lines.push(current);
            }
        }
    })?;

    info!("Extracted {} walkable path lines", lines.len());
    Ok(lines)
}
