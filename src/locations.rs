//! Named campus locations used to resolve typed destinations.

use std::path::Path;

use lazy_static::lazy_static;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::geometry::GeoPoint;
use crate::route::Destination;

/// A location record as stored by the campus backend. Coordinates are
/// optional so that incomplete records load and are rejected at lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    #[serde(rename = "areaName")]
    pub area_name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl NamedLocation {
    pub fn new(area_name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            area_name: area_name.into(),
            lat: Some(point.lat),
            lng: Some(point.lon),
        }
    }

    /// The coordinate, if present and valid.
    pub fn point(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.lat?, self.lng?);
        point.is_valid().then_some(point)
    }
}

lazy_static! {
    static ref SEED_LOCATIONS: Vec<NamedLocation> = vec![
        NamedLocation::new("Library", GeoPoint::new(12.9102945, 74.8997661)),
        NamedLocation::new("Cafeteria", GeoPoint::new(12.91088, 74.90055)),
        NamedLocation::new("Auditorium", GeoPoint::new(12.91123, 74.9012)),
        NamedLocation::new("Admin Block", GeoPoint::new(12.9098, 74.899)),
    ];
}

#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    entries: Vec<NamedLocation>,
}

impl LocationDirectory {
    pub fn new(entries: Vec<NamedLocation>) -> Self {
        Self { entries }
    }

    /// The built-in campus landmarks.
    pub fn seeded() -> Self {
        Self::new(SEED_LOCATIONS.clone())
    }

    /// Parses a JSON array of `{areaName, lat, lng}` records.
    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        let entries: Vec<NamedLocation> = serde_json::from_str(content)?;
        let unusable = entries.iter().filter(|e| e.point().is_none()).count();
        if unusable > 0 {
            warn!("{unusable} of {} locations have no usable coordinates", entries.len());
        }
        info!("Loaded {} named locations", entries.len());
        Ok(Self::new(entries))
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = NamedLocation>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[NamedLocation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact name match first, then substring match.
    /// Records without usable coordinates never match.
    pub fn find(&self, query: &str) -> Option<&NamedLocation> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let usable = || self.entries.iter().filter(|e| e.point().is_some());
        usable()
            .find(|e| e.area_name.to_lowercase() == query)
            .or_else(|| usable().find(|e| e.area_name.to_lowercase().contains(&query)))
    }

    pub fn resolve(&self, query: &str) -> Result<Destination, Error> {
        self.find(query)
            .and_then(|entry| Some(Destination::named(entry.area_name.clone(), entry.point()?)))
            .ok_or_else(|| Error::DestinationNotFound(query.trim().to_string()))
    }
}
