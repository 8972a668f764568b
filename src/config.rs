use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::graph::VisibilityParams;

/// Tunables for route synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Assumed walking speed for ETAs.
    pub walking_speed_mps: f64,
    /// Routes longer than this get an "alternate transport" advisory.
    pub long_route_threshold_m: f64,
    /// Samples per segment in containment checks.
    pub containment_steps: usize,
    /// Cap on boundary vertices used by the visibility graph.
    pub visibility_max_samples: usize,
    /// Points per drawn curve segment.
    pub curve_samples: usize,
    /// Inward nudge (degrees) applied to boundary vertices.
    pub vertex_inset_deg: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: 1.4,
            long_route_threshold_m: 800.0,
            containment_steps: 20,
            visibility_max_samples: 300,
            curve_samples: 24,
            vertex_inset_deg: 1e-6,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.walking_speed_mps.is_finite() && self.walking_speed_mps > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "walking_speed_mps must be positive, got {}",
                self.walking_speed_mps
            )));
        }
        if !(self.long_route_threshold_m.is_finite() && self.long_route_threshold_m > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "long_route_threshold_m must be positive, got {}",
                self.long_route_threshold_m
            )));
        }
        if self.containment_steps == 0 || self.visibility_max_samples == 0 || self.curve_samples == 0 {
            return Err(Error::InvalidConfig(
                "containment_steps, visibility_max_samples and curve_samples must be non-zero".to_string(),
            ));
        }
        if !(self.vertex_inset_deg.is_finite() && self.vertex_inset_deg > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "vertex_inset_deg must be positive, got {}",
                self.vertex_inset_deg
            )));
        }
        Ok(())
    }

    pub fn visibility_params(&self) -> VisibilityParams {
        VisibilityParams {
            max_samples: self.visibility_max_samples,
            steps: self.containment_steps,
            vertex_inset: self.vertex_inset_deg,
        }
    }
}

/// Settings for the HTTP service, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Campus outline, paths, rooms and named points.
    pub campus_geojson: Option<PathBuf>,
    /// OSM extract whose walkable ways become campus paths.
    pub osm_paths: Option<PathBuf>,
    /// JSON array of `{areaName, lat, lng}` records.
    pub locations: Option<PathBuf>,
    pub routing: RoutingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            campus_geojson: None,
            osm_paths: None,
            locations: None,
            routing: RoutingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.routing.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
