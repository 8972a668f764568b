//! Readers for the static campus data delivered to the routing core.

mod features;
mod osm;

pub use features::{CampusFeatures, load_campus_geojson, parse_campus_geojson};
pub use osm::{is_walkable, walkable_paths_from_pbf};

use itertools::Itertools;
use log::{debug, info};

use crate::Error;
use crate::config::ServerConfig;
use crate::geometry::{Boundary, GeoPoint};
use crate::locations::LocationDirectory;
use crate::route::CampusData;

/// Loads everything the configuration points at: the campus GeoJSON, OSM
/// walkable paths (clipped to the campus outline when there is one, then
/// added to the campus paths) and extra named locations on top of the
/// built-in ones.
pub fn load_campus(config: &ServerConfig) -> Result<(CampusData, LocationDirectory), Error> {
    let mut features = match &config.campus_geojson {
        Some(path) => load_campus_geojson(path)?,
        None => CampusFeatures::default(),
    };
    if let Some(path) = &config.osm_paths {
        let ways = walkable_paths_from_pbf(path)?;
        let ways = match &features.campus {
            Some(outline) => clip_to_outline(ways, outline, config.routing.containment_steps),
            None => ways,
        };
        features.paths.extend(ways);
    }

    let (data, named_points) = features.into_campus_data();
    let mut directory = LocationDirectory::seeded();
    directory.extend(named_points);
    if let Some(path) = &config.locations {
        directory.extend(LocationDirectory::from_file(path)?.entries().iter().cloned());
    }

    info!("Directory holds {} named locations", directory.len());
    Ok((data, directory))
}

/// Keeps only the pieces of `lines` whose segments stay inside `outline`;
/// a line that leaves and re-enters is split in two.
pub fn clip_to_outline(lines: Vec<Vec<GeoPoint>>, outline: &Boundary, steps: usize) -> Vec<Vec<GeoPoint>> {
    let before = lines.len();
    let mut clipped = Vec::new();
    for line in lines {
        let mut run: Vec<GeoPoint> = Vec::new();
        for (a, b) in line.iter().tuple_windows() {
            if outline.contains_segment(a, b, steps) {
                if run.is_empty() {
                    run.push(*a);
                }
                run.push(*b);
            } else if run.len() > 1 {
                clipped.push(std::mem::take(&mut run));
            } else {
                run.clear();
            }
        }
        if run.len() > 1 {
            clipped.push(run);
        }
    }
    debug!("Clipped {before} OSM ways to {} on-campus pieces", clipped.len());
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn square() -> Boundary {
        Boundary::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ])
    }

    #[test]
    fn test_clip_drops_off_campus_segments() {
        let inside_a = GeoPoint::new(0.2, 0.2);
        let inside_b = GeoPoint::new(0.2, 0.8);
        let outside = GeoPoint::new(2.0, 0.5);
        let inside_c = GeoPoint::new(0.8, 0.8);
        let inside_d = GeoPoint::new(0.8, 0.2);
        let lines = vec![
            vec![inside_a, inside_b, outside, inside_c, inside_d],
            vec![outside, GeoPoint::new(3.0, 3.0)],
            vec![inside_a, inside_d],
        ];

        let clipped = clip_to_outline(lines, &square(), 20);

        assert_eq!(
            clipped,
            vec![vec![inside_a, inside_b], vec![inside_c, inside_d], vec![inside_a, inside_d]]
        );
    }

    #[test]
    fn test_empty_config_gives_seeded_directory() {
        let (data, directory) = load_campus(&ServerConfig::default()).unwrap();
        assert!(data.campus.is_none());
        assert!(data.paths.is_none());
        assert_eq!(directory.len(), LocationDirectory::seeded().len());
    }

    #[test]
    fn test_missing_files_are_errors() {
        let config = ServerConfig {
            campus_geojson: Some(PathBuf::from("does/not/exist.geojson")),
            ..Default::default()
        };
        assert!(matches!(load_campus(&config), Err(Error::IoError(_))));
    }
}
