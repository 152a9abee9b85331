// Copyright 2016 The Cartographer Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Settings of the line-of-sight engine, read from JSON.

use crate::errors::*;
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLosConfig {
    /// Number of corners a diffraction path may turn.
    pub max_diffraction_count: usize,
    /// Roads whose directions differ by less than this see each other.
    pub los_threshold_degrees: f64,
    pub max_nlos_distance: f64,
}

impl Default for RoadLosConfig {
    fn default() -> Self {
        RoadLosConfig {
            max_diffraction_count: 2,
            los_threshold_degrees: 5.,
            max_nlos_distance: 1000.,
        }
    }
}

impl RoadLosConfig {
    pub fn los_threshold_radians(&self) -> f64 {
        self.los_threshold_degrees.to_radians()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialMapConfig {
    pub mesh_unit_meters: f64,
    pub max_mesh_number: usize,
}

impl SpatialMapConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.mesh_unit_meters.is_finite() && self.mesh_unit_meters > 0.) {
            bail!(ErrorKind::InvalidMeshUnit(self.mesh_unit_meters));
        }
        if self.max_mesh_number == 0 {
            bail!(ErrorKind::InvalidMeshNumber(self.max_mesh_number));
        }
        Ok(())
    }
}

impl Default for SpatialMapConfig {
    fn default() -> Self {
        SpatialMapConfig {
            mesh_unit_meters: 100.,
            max_mesh_number: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub name: String,
    pub transmission_loss_db: f64,
}

/// Box dimensions of one kind of moving object, e.g. "car".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingShapeConfig {
    pub shape_type: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LosConfig {
    pub road_los: RoadLosConfig,
    pub spatial_map: SpatialMapConfig,
    pub materials: Vec<MaterialConfig>,
    pub moving_shapes: Vec<MovingShapeConfig>,
    /// Materials of building surfaces that name none themselves.
    pub roof_material: String,
    pub floor_material: String,
    pub outer_wall_material: String,
}

impl Default for LosConfig {
    fn default() -> Self {
        LosConfig {
            road_los: RoadLosConfig::default(),
            spatial_map: SpatialMapConfig::default(),
            materials: Vec::new(),
            moving_shapes: Vec::new(),
            roof_material: "roof".to_string(),
            floor_material: "floor".to_string(),
            outer_wall_material: "outer_wall".to_string(),
        }
    }
}

impl LosConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).chain_err(|| format!("Could not open {}", path.display()))?;
        let config = serde_json::from_reader(BufReader::new(file))
            .chain_err(|| format!("Could not parse {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = LosConfig::from_json_str(r#"{ "road_los": { "max_diffraction_count": 3 } }"#).unwrap();
        assert_eq!(config.road_los.max_diffraction_count, 3);
        assert_eq!(config.road_los.los_threshold_degrees, 5.);
        assert_eq!(config.spatial_map, SpatialMapConfig::default());
        assert_eq!(config.roof_material, "roof");
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new("los_config").unwrap();
        let path = dir.path().join("config.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "materials": [{{ "name": "concrete", "transmission_loss_db": 12.5 }}],
                "moving_shapes": [
                    {{ "shape_type": "Car", "length": 4.5, "width": 1.8, "height": 1.5, "material": "concrete" }}
                ]
            }}"#
        )
        .unwrap();

        let config = LosConfig::from_file(&path).unwrap();
        assert_eq!(config.materials[0].transmission_loss_db, 12.5);
        assert_eq!(config.moving_shapes[0].shape_type, "Car");
    }

    #[test]
    fn test_errors() {
        assert!(LosConfig::from_json_str("{ materials: ").is_err());
        assert!(LosConfig::from_file("/nonexistent/config.json").is_err());
    }
}
